//! # Command emitter
//!
//! Serialises the initial pose and the per waypoint commands into the command
//! file read by the vehicle simulator, and the raw point log into the point
//! file used to redraw a stored path.
//!
//! Command file:
//!
//! ```text
//!     {x:.3},{y:.3},{heading:.8}
//!     {speed:.8},{angle:.8}
//!     ...
//! ```
//!
//! Point file, one `x,y` pixel pair per line and no newline after the last
//! pair.
//!
//! Both formats are exact: the same input always produces the same bytes.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use std::fmt::Write;
use std::str::FromStr;

use crate::{points::RawPoint, pose::Pose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single speed and steering angle pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Units: meters/sample
    pub speed: f64,

    /// Units: radians
    pub steer_angle_rad: f64,
}

/// Parsed contents of a command file.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFile {
    pub pose: Pose,
    pub commands: Vec<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmitError {
    #[error("Got {speeds} speeds but {angles} steering angles")]
    LengthMismatch { speeds: usize, angles: usize },

    #[error("Steering angle at waypoint {index} is undefined")]
    UndefinedAngle { index: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("The file is empty")]
    Empty,

    #[error("Line {line}: expected {expected} comma separated values, found {found}")]
    WrongFieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: cannot parse {value:?} as a number")]
    InvalidNumber { line: usize, value: String },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the command file for the given pose and per waypoint commands.
///
/// `speeds` and `angles` are indexed by waypoint and must have the same
/// length. Every angle must be finite.
pub fn emit_commands(pose: &Pose, speeds: &[f64], angles: &[f64]) -> Result<String, EmitError> {
    if speeds.len() != angles.len() {
        return Err(EmitError::LengthMismatch {
            speeds: speeds.len(),
            angles: angles.len(),
        });
    }

    if let Some(index) = angles.iter().position(|a| !a.is_finite()) {
        return Err(EmitError::UndefinedAngle { index });
    }

    let mut out = format!(
        "{:.3},{:.3},{:.8}\n",
        pose.position_m.x, pose.position_m.y, pose.heading_rad
    );

    for (speed, angle) in speeds.iter().zip(angles) {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{:.8},{:.8}", speed, angle);
    }

    Ok(out)
}

/// Build the point file for the given raw points.
pub fn emit_point_log(points: &[RawPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read a point file back into raw points.
pub fn parse_point_log(s: &str) -> Result<Vec<RawPoint>, ParseError> {
    s.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            let v: [i32; 2] = parse_fields(i + 1, l)?;
            Ok(RawPoint::new(v[0], v[1]))
        })
        .collect()
}

/// Split a line into exactly `N` comma separated numbers.
fn parse_fields<T: FromStr, const N: usize>(line: usize, s: &str) -> Result<[T; N], ParseError>
where
    T: Copy + Default,
{
    let fields: Vec<&str> = s.trim().split(',').collect();
    if fields.len() != N {
        return Err(ParseError::WrongFieldCount {
            line,
            expected: N,
            found: fields.len(),
        });
    }

    let mut values = [T::default(); N];
    for (v, f) in values.iter_mut().zip(fields) {
        *v = f.trim().parse().map_err(|_| ParseError::InvalidNumber {
            line,
            value: f.to_string(),
        })?;
    }

    Ok(values)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FromStr for CommandFile {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let pose = match lines.next() {
            Some((i, l)) => {
                let [x, y, heading_rad]: [f64; 3] = parse_fields(i + 1, l)?;
                Pose {
                    position_m: Vector2::new(x, y),
                    heading_rad,
                }
            }
            None => return Err(ParseError::Empty),
        };

        let commands = lines
            .map(|(i, l)| {
                let [speed, steer_angle_rad]: [f64; 2] = parse_fields(i + 1, l)?;
                Ok(Command {
                    speed,
                    steer_angle_rad,
                })
            })
            .collect::<Result<_, ParseError>>()?;

        Ok(Self { pose, commands })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pose() -> Pose {
        Pose {
            position_m: Vector2::new(1.0, 2.67),
            heading_rad: 0.123456789,
        }
    }

    #[test]
    fn test_command_format() {
        let out = emit_commands(&pose(), &[1.0, 0.5], &[0.0, -0.25]).unwrap();
        assert_eq!(
            out,
            "1.000,2.670,0.12345679\n\
             1.00000000,0.00000000\n\
             0.50000000,-0.25000000\n"
        );
    }

    #[test]
    fn test_pose_only() {
        let out = emit_commands(&pose(), &[], &[]).unwrap();
        assert_eq!(out, "1.000,2.670,0.12345679\n");
    }

    #[test]
    fn test_emit_errors() {
        assert_eq!(
            emit_commands(&pose(), &[1.0, 1.0], &[0.0]),
            Err(EmitError::LengthMismatch {
                speeds: 2,
                angles: 1
            })
        );
        assert_eq!(
            emit_commands(&pose(), &[1.0, 1.0], &[0.0, f64::NAN]),
            Err(EmitError::UndefinedAngle { index: 1 })
        );
    }

    #[test]
    fn test_point_log() {
        let points = vec![
            RawPoint::new(100, 200),
            RawPoint::new(101, 199),
            RawPoint::new(-3, 4),
        ];
        let log = emit_point_log(&points);
        assert_eq!(log, "100,200\n101,199\n-3,4");
        assert_eq!(parse_point_log(&log).unwrap(), points);

        assert_eq!(emit_point_log(&[]), "");
        assert_eq!(parse_point_log("").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_command_file() {
        let pose = Pose {
            position_m: Vector2::new(0.5, 4.17),
            heading_rad: -1.2345,
        };
        let out = emit_commands(&pose, &[0.2, 0.3], &[0.01, 0.02]).unwrap();
        let file: CommandFile = out.parse().unwrap();

        assert!((file.pose.position_m - pose.position_m).norm() < 1e-3);
        assert!((file.pose.heading_rad - pose.heading_rad).abs() < 1e-8);
        assert_eq!(
            file.commands,
            vec![
                Command {
                    speed: 0.2,
                    steer_angle_rad: 0.01
                },
                Command {
                    speed: 0.3,
                    steer_angle_rad: 0.02
                },
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<CommandFile>(), Err(ParseError::Empty));
        assert_eq!(
            "1.0,2.0\n".parse::<CommandFile>(),
            Err(ParseError::WrongFieldCount {
                line: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            "1.0,2.0,0.0\n0.5,abc\n".parse::<CommandFile>(),
            Err(ParseError::InvalidNumber {
                line: 2,
                value: "abc".into()
            })
        );
        assert!(parse_point_log("1,2\n3").is_err());
    }
}
