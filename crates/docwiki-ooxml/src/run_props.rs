//! Run properties (`w:rPr`) as a partial override
//!
//! Styles, document defaults and direct formatting all carry an `w:rPr`
//! that only mentions what it changes. [`RunPropsPatch`] keeps that
//! partiality; applying patches in inheritance order yields absolute
//! [`CharProps`].

use docwiki_core::{CaseMap, CharProps, Color, FontWeight, Posture, Strikeout, Underline};
use quick_xml::events::BytesStart;

use crate::xml::{get_attr_with_ns, toggle};

/// Vertical offset used for `w:vertAlign` superscript/subscript, in percent
pub const SCRIPT_ESCAPEMENT: i16 = 33;

/// Character properties mentioned by one `w:rPr`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPropsPatch {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub caps: Option<bool>,
    pub small_caps: Option<bool>,
    pub color: Option<Color>,
    pub escapement: Option<i16>,
    pub strike: Option<bool>,
    pub double_strike: Option<bool>,
    pub underline: Option<Underline>,
    pub underline_color: Option<Color>,
}

impl RunPropsPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one child element of `w:rPr`. Returns false for elements
    /// that do not affect character formatting.
    pub fn apply_element(&mut self, e: &BytesStart) -> bool {
        match e.local_name().as_ref() {
            b"b" => self.bold = Some(toggle(e)),
            b"i" => self.italic = Some(toggle(e)),
            b"caps" => self.caps = Some(toggle(e)),
            b"smallCaps" => self.small_caps = Some(toggle(e)),
            b"strike" => self.strike = Some(toggle(e)),
            b"dstrike" => self.double_strike = Some(toggle(e)),
            b"color" => {
                if let Some(color) =
                    get_attr_with_ns(e, b"w:val").and_then(|v| Color::from_hex(&v))
                {
                    self.color = Some(color);
                }
            }
            b"vertAlign" => {
                self.escapement = match get_attr_with_ns(e, b"w:val").as_deref() {
                    Some("superscript") => Some(SCRIPT_ESCAPEMENT),
                    Some("subscript") => Some(-SCRIPT_ESCAPEMENT),
                    Some("baseline") => Some(0),
                    _ => self.escapement,
                };
            }
            b"u" => {
                if let Some(kind) = get_attr_with_ns(e, b"w:val") {
                    self.underline = Some(underline_kind(&kind));
                }
                if let Some(color) =
                    get_attr_with_ns(e, b"w:color").and_then(|v| Color::from_hex(&v))
                {
                    self.underline_color = Some(color);
                }
            }
            _ => return false,
        }
        true
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay `other` on top of this patch
    pub fn merge(&mut self, other: &RunPropsPatch) {
        fn pick<T: Copy>(into: &mut Option<T>, from: Option<T>) {
            if from.is_some() {
                *into = from;
            }
        }
        pick(&mut self.bold, other.bold);
        pick(&mut self.italic, other.italic);
        pick(&mut self.caps, other.caps);
        pick(&mut self.small_caps, other.small_caps);
        pick(&mut self.color, other.color);
        pick(&mut self.escapement, other.escapement);
        pick(&mut self.strike, other.strike);
        pick(&mut self.double_strike, other.double_strike);
        pick(&mut self.underline, other.underline);
        pick(&mut self.underline_color, other.underline_color);
    }

    /// Apply the mentioned properties to absolute ones
    pub fn apply_to(&self, props: &mut CharProps) {
        if let Some(on) = self.bold {
            props.weight = if on { FontWeight::BOLD } else { FontWeight::NORMAL };
        }
        if let Some(on) = self.italic {
            props.posture = if on { Posture::Italic } else { Posture::Normal };
        }
        // caps wins over smallCaps when both are on
        if let Some(on) = self.small_caps {
            if on {
                props.case_map = CaseMap::SmallCaps;
            } else if props.case_map == CaseMap::SmallCaps {
                props.case_map = CaseMap::None;
            }
        }
        if let Some(on) = self.caps {
            if on {
                props.case_map = CaseMap::Upper;
            } else if props.case_map == CaseMap::Upper {
                props.case_map = CaseMap::None;
            }
        }
        if let Some(color) = self.color {
            props.color = color;
        }
        if let Some(escapement) = self.escapement {
            props.escapement = escapement;
        }
        if let Some(on) = self.strike {
            if on {
                props.strikeout = Strikeout::Single;
            } else if props.strikeout == Strikeout::Single {
                props.strikeout = Strikeout::None;
            }
        }
        if let Some(on) = self.double_strike {
            if on {
                props.strikeout = Strikeout::Double;
            } else if props.strikeout == Strikeout::Double {
                props.strikeout = Strikeout::None;
            }
        }
        if let Some(underline) = self.underline {
            props.underline = underline;
        }
        if let Some(color) = self.underline_color {
            props.underline_color = color;
        }
    }

    /// Absolute properties of this patch applied on `base`
    pub fn applied(&self, base: CharProps) -> CharProps {
        let mut props = base;
        self.apply_to(&mut props);
        props
    }
}

/// Map a `w:u/@w:val` value (ST_Underline)
pub fn underline_kind(value: &str) -> Underline {
    match value {
        "none" => Underline::None,
        "single" | "words" => Underline::Single,
        "double" => Underline::Double,
        "thick" => Underline::Bold,
        "dotted" => Underline::Dotted,
        "dottedHeavy" => Underline::BoldDotted,
        "dash" => Underline::Dash,
        "dashedHeavy" => Underline::BoldDash,
        "dashLong" => Underline::LongDash,
        "dashLongHeavy" => Underline::BoldLongDash,
        "dotDash" => Underline::DashDot,
        "dashDotHeavy" => Underline::BoldDashDot,
        "dotDotDash" => Underline::DashDotDot,
        "dashDotDotHeavy" => Underline::BoldDashDotDot,
        "wave" => Underline::Wave,
        "wavyHeavy" => Underline::BoldWave,
        "wavyDouble" => Underline::DoubleWave,
        _ => Underline::DontKnow,
    }
}
