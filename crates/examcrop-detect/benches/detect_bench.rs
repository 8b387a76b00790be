// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for question detection in the examcrop-detect crate.
// Runs the full detect pass (columns, builder, correction, merge) over a
// synthetic 45-question, two-column exam spread across eight pages.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use examcrop_core::{BBox, LayoutBlock, LayoutDocument, LayoutPage};
use examcrop_detect::QuestionDetector;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Build an exam where each page holds six questions, three per column, each
/// followed by four body blocks. Blocks are interleaved across columns the way
/// layout engines report them.
fn synthetic_exam() -> LayoutDocument {
    let mut pages = Vec::new();
    let mut number = 1u32;

    for index in 0..8 {
        let mut blocks = Vec::new();
        for slot in 0..3 {
            for (x0, x1) in [(40.0, 400.0), (440.0, 800.0)] {
                if number > 45 {
                    break;
                }
                let top = 80.0 + slot as f32 * 360.0;
                blocks.push(LayoutBlock::text(
                    BBox::new(x0, top, x1, top + 24.0),
                    format!("{number}. 다음 글의 내용과 일치하지 않는 것은?"),
                ));
                for line in 1..=4 {
                    let y = top + line as f32 * 60.0;
                    blocks.push(LayoutBlock::text(
                        BBox::new(x0, y, x1, y + 40.0),
                        "The committee announced the results of the annual survey.",
                    ));
                }
                number += 1;
            }
        }
        pages.push(LayoutPage {
            index,
            width: 842.0,
            height: 1191.0,
            blocks,
        });
    }

    LayoutDocument { pages }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_detect(c: &mut Criterion) {
    let document = synthetic_exam();
    let detector = QuestionDetector::default();

    c.bench_function("detect (45 questions, 8 pages)", |b| {
        b.iter(|| {
            let regions = detector.detect(black_box(&document));
            black_box(regions);
        });
    });
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
