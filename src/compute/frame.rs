//! Frame builder - turns one record into the three colored edges of a triangle.

use super::Rgb;
use crate::schema::{MIN_FIELDS, POINT_A_OFFSET, POINT_B_OFFSET, POINT_C_OFFSET, Point, Record};

/// Color of the A-B edge.
pub const EDGE_AB_COLOR: Rgb = Rgb::RED;
/// Color of the A-C edge.
pub const EDGE_AC_COLOR: Rgb = Rgb::GREEN;
/// Color of the C-B edge.
pub const EDGE_CB_COLOR: Rgb = Rgb::BLUE;

/// A colored line segment in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub color: Rgb,
}

impl Segment {
    pub const fn new(start: Point, end: Point, color: Rgb) -> Self {
        Self { start, end, color }
    }
}

/// One animation frame: the edges A-B (red), A-C (green) and C-B (blue), in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub segments: [Segment; 3],
}

impl Frame {
    /// Build the frame for triangle `abc`.
    pub fn triangle(a: Point, b: Point, c: Point) -> Self {
        Self {
            segments: [
                Segment::new(a, b, EDGE_AB_COLOR),
                Segment::new(a, c, EDGE_AC_COLOR),
                Segment::new(c, b, EDGE_CB_COLOR),
            ],
        }
    }

    /// Iterate over every segment endpoint.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().flat_map(|s| [s.start, s.end])
    }
}

/// Frame building errors.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Record on line {line} has {fields} fields, at least {required} are needed")]
    OutOfRange {
        line: usize,
        fields: usize,
        required: usize,
    },
}

/// Build the frame for `record`, which was read from 1-based `line`.
pub fn build_frame(line: usize, record: &Record) -> Result<Frame, FrameError> {
    let out_of_range = || FrameError::OutOfRange {
        line,
        fields: record.len(),
        required: MIN_FIELDS,
    };

    let a = record.point_at(POINT_A_OFFSET).ok_or_else(out_of_range)?;
    let b = record.point_at(POINT_B_OFFSET).ok_or_else(out_of_range)?;
    let c = record.point_at(POINT_C_OFFSET).ok_or_else(out_of_range)?;

    Ok(Frame::triangle(a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_records;
    use proptest::prelude::*;

    #[test]
    fn test_right_triangle() {
        let records = parse_records("0.0,0.0,0,0,0,0,1.0,0.0,0,0,0,0,0.0,1.0").unwrap();
        let frame = build_frame(1, &records[0]).unwrap();

        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(0.0, 1.0);

        assert_eq!(frame.segments[0], Segment::new(a, b, Rgb::RED));
        assert_eq!(frame.segments[1], Segment::new(a, c, Rgb::GREEN));
        assert_eq!(frame.segments[2], Segment::new(c, b, Rgb::BLUE));
    }

    #[test]
    fn test_short_record() {
        let record = Record::new(vec![0.0; 10]);
        let err = build_frame(7, &record).unwrap_err();
        let FrameError::OutOfRange {
            line,
            fields,
            required,
        } = err;
        assert_eq!((line, fields, required), (7, 10, 14));
    }

    #[test]
    fn test_thirteen_fields_is_short() {
        let record = Record::new(vec![0.0; 13]);
        assert!(build_frame(1, &record).is_err());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let fields: Vec<f64> = (0..18).map(|i| i as f64).collect();
        let frame = build_frame(1, &Record::new(fields)).unwrap();
        assert_eq!(frame.segments[0].start, Point::new(0.0, 1.0));
        assert_eq!(frame.segments[0].end, Point::new(6.0, 7.0));
        assert_eq!(frame.segments[1].end, Point::new(12.0, 13.0));
    }

    proptest! {
        #[test]
        fn prop_segments_follow_offsets(fields in prop::collection::vec(-1e6f64..1e6, 14..32)) {
            let record = Record::new(fields.clone());
            let frame = build_frame(1, &record).unwrap();

            let a = Point::new(fields[0], fields[1]);
            let b = Point::new(fields[6], fields[7]);
            let c = Point::new(fields[12], fields[13]);

            prop_assert_eq!(frame.segments[0], Segment::new(a, b, Rgb::RED));
            prop_assert_eq!(frame.segments[1], Segment::new(a, c, Rgb::GREEN));
            prop_assert_eq!(frame.segments[2], Segment::new(c, b, Rgb::BLUE));
        }
    }
}
