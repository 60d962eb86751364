//! Character formatting attributes
//!
//! The closed set of formatting kinds the engine knows how to resolve and
//! render. Every run and every style carries an absolute [`CharProps`]
//! value; the resolver compares those to decide which [`AttributeValue`]s
//! must be written out explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a character formatting attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Link target of a hyperlink run
    HyperlinkTarget,
    /// Font posture (italic)
    Italic,
    /// Font weight (bold)
    Bold,
    /// Case transformation
    CaseMap,
    /// Font color
    FontColor,
    /// Vertical escapement: positive is superscript, negative is subscript
    Escapement,
    /// Strikeout kind
    Strikeout,
    /// Underline kind
    Underline,
    /// Underline color
    UnderlineColor,
}

impl AttributeKind {
    /// Kinds in resolution order. Resolved attributes keep this order,
    /// which makes rendering deterministic.
    pub const RESOLUTION_ORDER: [AttributeKind; 9] = [
        AttributeKind::HyperlinkTarget,
        AttributeKind::Italic,
        AttributeKind::Bold,
        AttributeKind::CaseMap,
        AttributeKind::FontColor,
        AttributeKind::Escapement,
        AttributeKind::Strikeout,
        AttributeKind::Underline,
        AttributeKind::UnderlineColor,
    ];

    /// Kinds that are compared against styles (everything but the link target)
    pub const CHARACTER: [AttributeKind; 8] = [
        AttributeKind::Italic,
        AttributeKind::Bold,
        AttributeKind::CaseMap,
        AttributeKind::FontColor,
        AttributeKind::Escapement,
        AttributeKind::Strikeout,
        AttributeKind::Underline,
        AttributeKind::UnderlineColor,
    ];

    /// Whether the attribute stays visible on whitespace-only text
    pub fn visible_on_whitespace(self) -> bool {
        matches!(
            self,
            AttributeKind::HyperlinkTarget | AttributeKind::Strikeout | AttributeKind::Underline
        )
    }

    /// Whether a hyperlink renders this attribute on its own
    pub fn absorbed_by_hyperlink(self) -> bool {
        matches!(
            self,
            AttributeKind::Underline | AttributeKind::UnderlineColor | AttributeKind::FontColor
        )
    }

    /// Human-readable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::HyperlinkTarget => "hyperlink target",
            AttributeKind::Italic => "italic",
            AttributeKind::Bold => "bold",
            AttributeKind::CaseMap => "case map",
            AttributeKind::FontColor => "font color",
            AttributeKind::Escapement => "escapement",
            AttributeKind::Strikeout => "strikeout",
            AttributeKind::Underline => "underline",
            AttributeKind::UnderlineColor => "underline color",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Font posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    #[default]
    Normal,
    Oblique,
    Italic,
}

/// Font weight on the CSS 100-900 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Weights from semi-bold upwards are rendered as bold
    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        FontWeight::NORMAL
    }
}

/// Case transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMap {
    #[default]
    None,
    Upper,
    Lower,
    Title,
    SmallCaps,
}

/// A color value
///
/// `Auto` means "whatever the renderer considers the default", typically
/// black text or an underline colored like its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Auto,
    /// 24-bit `0xRRGGBB` value
    Rgb(u32),
}

impl Color {
    /// Parse a `RRGGBB` or `#RRGGBB` hex string; `auto` yields [`Color::Auto`]
    pub fn from_hex(value: &str) -> Option<Color> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Some(Color::Auto);
        }
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color::Rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => f.write_str("auto"),
            Color::Rgb(rgb) => write!(f, "#{:06X}", rgb & 0x00FF_FFFF),
        }
    }
}

/// Strikeout kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strikeout {
    #[default]
    None,
    Single,
    Double,
    Bold,
    Slash,
    X,
    /// Source reported a kind it could not name
    DontKnow,
}

/// Underline kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    Dotted,
    Dash,
    LongDash,
    DashDot,
    DashDotDot,
    SmallWave,
    Wave,
    DoubleWave,
    Bold,
    BoldDotted,
    BoldDash,
    BoldLongDash,
    BoldDashDot,
    BoldDashDotDot,
    BoldWave,
    /// Source reported a kind it could not name
    DontKnow,
}

/// A single attribute value, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    HyperlinkTarget(String),
    Italic(Posture),
    Bold(FontWeight),
    CaseMap(CaseMap),
    FontColor(Color),
    Escapement(i16),
    Strikeout(Strikeout),
    Underline(Underline),
    UnderlineColor(Color),
}

impl AttributeValue {
    /// The kind of this value
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::HyperlinkTarget(_) => AttributeKind::HyperlinkTarget,
            AttributeValue::Italic(_) => AttributeKind::Italic,
            AttributeValue::Bold(_) => AttributeKind::Bold,
            AttributeValue::CaseMap(_) => AttributeKind::CaseMap,
            AttributeValue::FontColor(_) => AttributeKind::FontColor,
            AttributeValue::Escapement(_) => AttributeKind::Escapement,
            AttributeValue::Strikeout(_) => AttributeKind::Strikeout,
            AttributeValue::Underline(_) => AttributeKind::Underline,
            AttributeValue::UnderlineColor(_) => AttributeKind::UnderlineColor,
        }
    }
}

/// Absolute character properties of a run or a style
///
/// Unset fields deserialize to the document-wide baseline, so a style
/// table only needs to list what a style actually changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharProps {
    pub posture: Posture,
    pub weight: FontWeight,
    pub case_map: CaseMap,
    pub color: Color,
    pub escapement: i16,
    pub strikeout: Strikeout,
    pub underline: Underline,
    pub underline_color: Color,
}

impl CharProps {
    /// Value of one attribute kind. The link target is not a character
    /// property and yields `None`.
    pub fn value(&self, kind: AttributeKind) -> Option<AttributeValue> {
        let value = match kind {
            AttributeKind::HyperlinkTarget => return None,
            AttributeKind::Italic => AttributeValue::Italic(self.posture),
            AttributeKind::Bold => AttributeValue::Bold(self.weight),
            AttributeKind::CaseMap => AttributeValue::CaseMap(self.case_map),
            AttributeKind::FontColor => AttributeValue::FontColor(self.color),
            AttributeKind::Escapement => AttributeValue::Escapement(self.escapement),
            AttributeKind::Strikeout => AttributeValue::Strikeout(self.strikeout),
            AttributeKind::Underline => AttributeValue::Underline(self.underline),
            AttributeKind::UnderlineColor => AttributeValue::UnderlineColor(self.underline_color),
        };
        Some(value)
    }

    /// Overwrite the property matching `value`'s kind
    pub fn set(&mut self, value: AttributeValue) {
        match value {
            AttributeValue::HyperlinkTarget(_) => {}
            AttributeValue::Italic(v) => self.posture = v,
            AttributeValue::Bold(v) => self.weight = v,
            AttributeValue::CaseMap(v) => self.case_map = v,
            AttributeValue::FontColor(v) => self.color = v,
            AttributeValue::Escapement(v) => self.escapement = v,
            AttributeValue::Strikeout(v) => self.strikeout = v,
            AttributeValue::Underline(v) => self.underline = v,
            AttributeValue::UnderlineColor(v) => self.underline_color = v,
        }
    }

    /// Builder form of [`CharProps::set`]
    pub fn with(mut self, value: AttributeValue) -> Self {
        self.set(value);
        self
    }

    pub fn italic(self) -> Self {
        self.with(AttributeValue::Italic(Posture::Italic))
    }

    pub fn bold(self) -> Self {
        self.with(AttributeValue::Bold(FontWeight::BOLD))
    }
}
