// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line templates and timestamp formats
use std::fmt::{self, Write};
use std::mem::take;

use time::format_description::{self, BorrowedFormatItem, OwnedFormatItem};
use time::macros::format_description as date_format;
use time::OffsetDateTime;

use crate::dispatch::Record;
use crate::{Error, Result};

/// Default line template for both sinks
pub const DEFAULT_FORMAT: &str = "{timestamp} - {name} - {level} - {message}";
/// Default timestamp format for both sinks, e.g. `2023-04-11T11:16:43+0200`
pub const DEFAULT_DATEFMT: &str =
	"[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]";
const DEFAULT_DATE_ITEMS: &[BorrowedFormatItem<'_>] = date_format!(
	"[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
	Timestamp,
	Name,
	Level,
	Message,
	Target,
}

impl Field {
	fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"timestamp" => Self::Timestamp,
			"name" => Self::Name,
			"level" => Self::Level,
			"message" => Self::Message,
			"target" => Self::Target,
			_ => return None,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Text(String),
	Field(Field),
}

/// A parsed line template.
///
/// Fields are written as `{timestamp}`, `{name}`, `{level}`, `{message}` and
/// `{target}`; literal braces are doubled (`{{`, `}}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
	segments: Vec<Segment>,
}

impl LineFormat {
	/// Parse a template
	/// # Errors
	/// on unknown fields or unbalanced braces
	pub fn parse(template: &str) -> Result<Self> {
		let invalid = |reason| Error::InvalidFormat {
			format: template.to_owned(),
			reason,
		};
		let mut segments = Vec::new();
		let mut text = String::new();
		let mut chars = template.chars();
		while let Some(ch) = chars.next() {
			match ch {
				'{' => {
					let rest = chars.as_str();
					if let Some(after) = rest.strip_prefix('{') {
						text.push('{');
						chars = after.chars();
						continue;
					}
					let (name, after) = rest.split_once('}').ok_or_else(|| invalid("unclosed '{'"))?;
					let field = Field::from_name(name).ok_or_else(|| invalid("unknown field"))?;
					if !text.is_empty() {
						segments.push(Segment::Text(take(&mut text)));
					}
					segments.push(Segment::Field(field));
					chars = after.chars();
				}
				'}' => {
					let rest = chars.as_str();
					let after = rest.strip_prefix('}').ok_or_else(|| invalid("unmatched '}'"))?;
					text.push('}');
					chars = after.chars();
				}
				_ => text.push(ch),
			}
		}
		if !text.is_empty() {
			segments.push(Segment::Text(text));
		}
		Ok(Self { segments })
	}
	/// Render one record into `out`, without a trailing newline
	pub(crate) fn render(&self, out: &mut String, record: &Record, datefmt: &DateFormat) {
		for segment in &self.segments {
			match segment {
				Segment::Text(text) => out.push_str(text),
				Segment::Field(Field::Timestamp) => datefmt.render(out, record.time),
				Segment::Field(Field::Name) => out.push_str(record.name),
				Segment::Field(Field::Level) => out.push_str(record.level.as_str()),
				Segment::Field(Field::Message) => _ = out.write_fmt(record.args),
				Segment::Field(Field::Target) => out.push_str(record.target),
			}
		}
	}
}

impl Default for LineFormat {
	fn default() -> Self {
		Self {
			segments: vec![
				Segment::Field(Field::Timestamp),
				Segment::Text(" - ".to_owned()),
				Segment::Field(Field::Name),
				Segment::Text(" - ".to_owned()),
				Segment::Field(Field::Level),
				Segment::Text(" - ".to_owned()),
				Segment::Field(Field::Message),
			],
		}
	}
}

/// A parsed timestamp format, using the [`time`] format description syntax
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat(OwnedFormatItem);

impl DateFormat {
	/// Parse a format description
	/// # Errors
	/// if the description is malformed
	pub fn parse(description: &str) -> Result<Self> {
		format_description::parse_owned::<2>(description)
			.map(Self)
			.map_err(|source| Error::InvalidDateFormat {
				format: description.to_owned(),
				source,
			})
	}
	/// Format a point in time, returning an empty string if the format
	/// needs components the time doesn't have
	pub fn format(&self, time: OffsetDateTime) -> String {
		time.format(&self.0).unwrap_or_default()
	}
	fn render(&self, out: &mut String, time: OffsetDateTime) { out.push_str(&self.format(time)); }
}

impl Default for DateFormat {
	fn default() -> Self {
		Self(OwnedFormatItem::from(DEFAULT_DATE_ITEMS))
	}
}

impl fmt::Display for LineFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for segment in &self.segments {
			match segment {
				Segment::Text(text) => {
					for ch in text.chars() {
						match ch {
							'{' => f.write_str("{{")?,
							'}' => f.write_str("}}")?,
							_ => f.write_char(ch)?,
						}
					}
				}
				Segment::Field(field) => write!(f, "{{{}}}", match field {
					Field::Timestamp => "timestamp",
					Field::Name => "name",
					Field::Level => "level",
					Field::Message => "message",
					Field::Target => "target",
				})?,
			}
		}
		Ok(())
	}
}
