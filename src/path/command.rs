use crate::math::Point3;

/// One drawing command of a path's command stream.
///
/// The engine consumes any iterator of commands; how the stream is stored
/// or edited is the caller's concern. Coordinates of 2D paths carry
/// `z = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Establishes the path's starting point. Repeated moves before any
    /// drawing collapse to the last one.
    MoveTo(Point3),
    /// Straight segment from the current point.
    LineTo(Point3),
    /// Quadratic segment from the current point.
    QuadTo { control: Point3, end: Point3 },
    /// Cubic segment from the current point.
    CubicTo {
        control1: Point3,
        control2: Point3,
        end: Point3,
    },
    /// Closes the path. If the current point does not coincide with the
    /// start, a straight closing edge is synthesized.
    Close,
}
