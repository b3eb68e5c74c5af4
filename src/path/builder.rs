//! Command-stream validation and segment assembly.

use crate::error::{Result, StructureError};
use crate::geometry::Segment;
use crate::math::{points_coincident, Point3};

use super::PathCommand;

/// Assembles a validated segment array from a drawing-command stream.
///
/// Returns the ordered segments and the closed flag. Structural rules:
///
/// - drawing before the initial move is an error;
/// - moves before any drawing overwrite the recorded start; a move after
///   drawing began is an error (subpaths are not supported);
/// - any command after a close is an error, except a redundant close,
///   which is ignored;
/// - a close whose current point does not coincide with the start (within
///   an ULP-scaled tolerance) synthesizes a straight closing edge;
/// - the final segment of a closed path is tagged as the closing edge.
pub(crate) fn assemble(commands: &[PathCommand]) -> Result<(Vec<Segment>, bool)> {
    let mut start: Option<Point3> = None;
    let mut current = Point3::origin();
    let mut segments: Vec<Segment> = Vec::new();
    let mut closed = false;

    for command in commands {
        if closed && *command != PathCommand::Close {
            return Err(StructureError::CommandAfterClose.into());
        }
        match *command {
            PathCommand::MoveTo(p) => {
                if segments.is_empty() {
                    start = Some(p);
                    current = p;
                } else {
                    return Err(StructureError::MoveAfterDraw.into());
                }
            }
            PathCommand::LineTo(p) => {
                require_started(start)?;
                segments.push(Segment::line(current, p));
                current = p;
            }
            PathCommand::QuadTo { control, end } => {
                require_started(start)?;
                segments.push(Segment::quad(current, control, end));
                current = end;
            }
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => {
                require_started(start)?;
                segments.push(Segment::cubic(current, control1, control2, end));
                current = end;
            }
            PathCommand::Close => {
                closed = true;
                if let Some(anchor) = start {
                    if !segments.is_empty() && !points_coincident(&current, &anchor) {
                        segments.push(Segment::line(current, anchor));
                        current = anchor;
                    }
                }
                if let Some(last) = segments.last_mut() {
                    last.mark_closing();
                }
            }
        }
    }

    Ok((segments, closed))
}

fn require_started(start: Option<Point3>) -> Result<()> {
    if start.is_none() {
        return Err(StructureError::MissingInitialMove.into());
    }
    Ok(())
}
