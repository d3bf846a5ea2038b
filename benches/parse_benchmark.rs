//! Benchmarks for unocr decoding performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks decode synthetic hOCR and ALTO documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unocr::{OcrFormat, ParseOptions, Size};

const LINES_PER_PAGE: usize = 40;
const WORDS_PER_LINE: usize = 10;

/// Creates a synthetic hOCR document with the given number of pages.
fn create_test_hocr(page_count: usize) -> String {
    let mut content = String::from("<!DOCTYPE html>\n<html><head><title>bench</title></head><body>\n");

    for p in 0..page_count {
        content.push_str(&format!(
            "<div class='ocr_page' id='page_{}' title='image \"p{}.png\"; bbox 0 0 2480 3508; ppageno {}'>\n",
            p + 1,
            p,
            p
        ));
        content.push_str("<div class='ocr_carea' title='bbox 100 100 2380 3400'><p class='ocr_par' title='bbox 100 100 2380 3400'>\n");
        for l in 0..LINES_PER_PAGE {
            let y = 100 + l * 80;
            content.push_str(&format!(
                "<span class='ocr_line' title='bbox 100 {} 2380 {}; baseline 0.001 -12'>",
                y,
                y + 60
            ));
            for w in 0..WORDS_PER_LINE {
                let x = 100 + w * 228;
                content.push_str(&format!(
                    "<span class='ocrx_word' title='bbox {} {} {} {}; x_wconf 93'>word{}</span> ",
                    x,
                    y,
                    x + 200,
                    y + 60,
                    w
                ));
            }
            content.push_str("</span>\n");
        }
        content.push_str("</p></div></div>\n");
    }

    content.push_str("</body></html>\n");
    content
}

/// Creates a synthetic ALTO document with the given number of pages.
fn create_test_alto(page_count: usize) -> String {
    let mut content = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <alto xmlns=\"http://www.loc.gov/standards/alto/ns-v4#\">\
         <Description><MeasurementUnit>pixel</MeasurementUnit></Description><Layout>\n",
    );

    for p in 0..page_count {
        content.push_str(&format!(
            "<Page ID='p{}' PHYSICAL_IMG_NR='{}' WIDTH='2480' HEIGHT='3508'><PrintSpace>\
             <TextBlock HPOS='100' VPOS='100' WIDTH='2280' HEIGHT='3300'>\n",
            p, p
        ));
        for l in 0..LINES_PER_PAGE {
            let y = 100 + l * 80;
            content.push_str(&format!(
                "<TextLine HPOS='100' VPOS='{}' WIDTH='2280' HEIGHT='60' BASELINE='{}'>",
                y,
                y + 48
            ));
            for w in 0..WORDS_PER_LINE {
                if w > 0 {
                    content.push_str("<SP/>");
                }
                content.push_str(&format!(
                    "<String CONTENT='word{}' HPOS='{}' VPOS='{}' WIDTH='200' HEIGHT='60' WC='0.93'/>",
                    w,
                    100 + w * 228,
                    y
                ));
            }
            content.push_str("</TextLine>\n");
        }
        content.push_str("</TextBlock></PrintSpace></Page>\n");
    }

    content.push_str("</Layout></alto>\n");
    content
}

/// Benchmark format detection.
fn bench_format_detection(c: &mut Criterion) {
    let hocr = create_test_hocr(1);
    let alto = create_test_alto(1);

    c.bench_function("detect_hocr", |b| {
        b.iter(|| unocr::detect_format_from_bytes(black_box(hocr.as_bytes())).unwrap());
    });

    c.bench_function("detect_alto", |b| {
        b.iter(|| unocr::detect_format_from_bytes(black_box(alto.as_bytes())).unwrap());
    });
}

/// Benchmark decoding at various sizes.
fn bench_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoding");

    for page_count in [1, 5, 10].iter() {
        let hocr = create_test_hocr(*page_count);
        let alto = create_test_alto(*page_count);

        group.bench_function(format!("hocr_{}_pages", page_count), |b| {
            b.iter(|| unocr::parse_str(black_box(&hocr), OcrFormat::Hocr).unwrap());
        });

        group.bench_function(format!("alto_{}_pages", page_count), |b| {
            b.iter(|| unocr::parse_str(black_box(&alto), OcrFormat::Alto).unwrap());
        });
    }

    group.finish();
}

/// Benchmark decoding with scaling to a reference size.
fn bench_scaled_decoding(c: &mut Criterion) {
    let hocr = create_test_hocr(5);

    c.bench_function("hocr_scaled", |b| {
        b.iter(|| {
            let options = ParseOptions::new(OcrFormat::Hocr)
                .with_reference_size_fn(|_, _| Some(Size::new(1240.0, 1754.0)));
            unocr::parse_str_with_options(black_box(&hocr), options).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_decoding,
    bench_scaled_decoding,
);
criterion_main!(benches);
