use egui::Pos2;

use crate::annotation::{Annotation, ShapeKind};

/// Pixel tolerance for line and arrow hits, in content coordinates.
pub const LINE_HIT_TOLERANCE: f32 = 5.0;

/// Whether `point` lies on or inside `annotation`.
///
/// - Circle: inside the circle centered on `start` whose radius is the
///   drag vector `start -> end`.
/// - Square: inside the closed axis-aligned box spanned by `start`/`end`.
/// - Line/Arrow: within [`LINE_HIT_TOLERANCE`] of the *infinite* line
///   through the endpoints. Clicks far beyond the segment's ends still
///   register; that quirk is intentional and pinned by a test below.
///   The arrowhead is ignored.
/// - Text: never hit; text is placed once and not relocatable.
pub fn contains(annotation: &Annotation, point: Pos2) -> bool {
    match annotation {
        Annotation::Shape { kind, start, end, .. } => match kind {
            ShapeKind::Circle => point.distance(*start) <= start.distance(*end),
            ShapeKind::Square => {
                point.x >= start.x.min(end.x)
                    && point.x <= start.x.max(end.x)
                    && point.y >= start.y.min(end.y)
                    && point.y <= start.y.max(end.y)
            }
            ShapeKind::Line | ShapeKind::Arrow => line_hit(*start, *end, point),
        },
        Annotation::Text { .. } => false,
    }
}

/// Perpendicular distance from `point` to the infinite line through
/// `start`/`end`, compared against the tolerance. A degenerate segment
/// (`start == end`) has no defined line and never hits.
fn line_hit(start: Pos2, end: Pos2, point: Pos2) -> bool {
    let length = start.distance(end);
    if length == 0.0 {
        return false;
    }
    let distance = ((end.y - start.y) * point.x - (end.x - start.x) * point.y
        + end.x * start.y
        - end.y * start.x)
        .abs()
        / length;
    distance < LINE_HIT_TOLERANCE
}

/// Index of the topmost annotation under `point`, scanning newest to
/// oldest so the most recently drawn shape wins overlapping hits.
pub fn topmost_hit(annotations: &[Annotation], point: Pos2) -> Option<usize> {
    annotations
        .iter()
        .enumerate()
        .rev()
        .find(|(_, annotation)| contains(annotation, point))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{ColorId, FontSpec};
    use egui::pos2;

    fn circle(start: Pos2, end: Pos2) -> Annotation {
        Annotation::Shape {
            kind: ShapeKind::Circle,
            color: ColorId::Green,
            start,
            end,
        }
    }

    #[test]
    fn circle_contains_center_and_rim() {
        // Radius 30 around (50, 50).
        let c = circle(pos2(50.0, 50.0), pos2(80.0, 50.0));
        assert!(contains(&c, pos2(50.0, 50.0)));
        assert!(contains(&c, pos2(50.0, 80.0)));
        assert!(!contains(&c, pos2(50.0, 81.0)));
    }

    #[test]
    fn square_uses_closed_bounding_box() {
        let s = Annotation::Shape {
            kind: ShapeKind::Square,
            color: ColorId::Red,
            start: pos2(10.0, 10.0),
            end: pos2(40.0, 30.0),
        };
        assert!(contains(&s, pos2(25.0, 20.0)));
        assert!(contains(&s, pos2(10.0, 10.0)));
        assert!(!contains(&s, pos2(5.0, 20.0)));

        // Endpoints given in reverse order span the same box.
        let flipped = Annotation::Shape {
            kind: ShapeKind::Square,
            color: ColorId::Red,
            start: pos2(40.0, 30.0),
            end: pos2(10.0, 10.0),
        };
        assert!(contains(&flipped, pos2(25.0, 20.0)));
    }

    #[test]
    fn line_hits_within_tolerance() {
        let l = Annotation::Shape {
            kind: ShapeKind::Line,
            color: ColorId::Blue,
            start: pos2(0.0, 0.0),
            end: pos2(100.0, 0.0),
        };
        assert!(contains(&l, pos2(50.0, 4.0)));
        assert!(!contains(&l, pos2(50.0, 6.0)));
    }

    #[test]
    fn line_hit_extends_beyond_segment_ends() {
        // The test measures distance to the infinite line, so a point far
        // past the endpoint still hits as long as it stays near the line.
        let l = Annotation::Shape {
            kind: ShapeKind::Line,
            color: ColorId::Blue,
            start: pos2(0.0, 0.0),
            end: pos2(100.0, 0.0),
        };
        assert!(contains(&l, pos2(500.0, 1.0)));
    }

    #[test]
    fn degenerate_line_never_hits() {
        let l = Annotation::Shape {
            kind: ShapeKind::Line,
            color: ColorId::Blue,
            start: pos2(10.0, 10.0),
            end: pos2(10.0, 10.0),
        };
        assert!(!contains(&l, pos2(10.0, 10.0)));
    }

    #[test]
    fn arrow_hit_tests_like_its_shaft() {
        let a = Annotation::Shape {
            kind: ShapeKind::Arrow,
            color: ColorId::Black,
            start: pos2(0.0, 0.0),
            end: pos2(0.0, 100.0),
        };
        assert!(contains(&a, pos2(3.0, 50.0)));
        assert!(!contains(&a, pos2(8.0, 50.0)));
    }

    #[test]
    fn text_never_hits() {
        let t = Annotation::Text {
            color: ColorId::Green,
            content: "hello".to_owned(),
            anchor: pos2(20.0, 20.0),
            font: FontSpec::default(),
        };
        assert!(!contains(&t, pos2(20.0, 20.0)));
    }

    #[test]
    fn newest_annotation_wins_overlapping_hits() {
        let first = circle(pos2(50.0, 50.0), pos2(80.0, 50.0));
        let second = circle(pos2(55.0, 50.0), pos2(85.0, 50.0));
        let list = vec![first, second];
        assert_eq!(topmost_hit(&list, pos2(55.0, 50.0)), Some(1));
    }

    #[test]
    fn miss_yields_none() {
        let list = vec![circle(pos2(50.0, 50.0), pos2(60.0, 50.0))];
        assert_eq!(topmost_hit(&list, pos2(500.0, 500.0)), None);
    }
}
