//! Style changes applied on top of a template cell's existing format
//!
//! Templates carry their own fonts, borders and fills. Rather than replacing
//! a cell's format, a [`CellFormat`] only names the attributes to change;
//! everything it leaves as `None` is kept from the cell's current format.

/// Number format for cell display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberFormat(pub u32);

impl NumberFormat {
    /// 0 - General
    pub const GENERAL: Self = NumberFormat(0);
    /// 4 - #,##0.00
    pub const THOUSANDS_2DP: Self = NumberFormat(4);
    /// 14 - mm-dd-yy
    pub const DATE_SHORT: Self = NumberFormat(14);

    /// Built-in format ID
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Whether a built-in format ID displays a date or time
    pub fn is_builtin_date(id: u32) -> bool {
        matches!(id, 14..=22 | 27..=36 | 45..=47 | 50..=58)
    }

    /// Whether a custom format code displays a date or time.
    ///
    /// Date tokens (`d`, `m`, `y`, `h`, `s`) count only outside quoted
    /// literals, escaped characters and bracketed sections such as colors.
    pub fn is_date_code(code: &str) -> bool {
        let mut chars = code.chars();
        let mut in_quotes = false;
        let mut in_brackets = false;

        while let Some(c) = chars.next() {
            match c {
                '"' => in_quotes = !in_quotes,
                _ if in_quotes => {}
                '\\' | '_' | '*' => {
                    chars.next();
                }
                '[' => in_brackets = true,
                ']' => in_brackets = false,
                _ if in_brackets => {}
                'd' | 'D' | 'm' | 'M' | 'y' | 'Y' | 'h' | 'H' | 's' | 'S' => return true,
                _ => {}
            }
        }

        false
    }
}

/// Horizontal alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlignment {
    /// Attribute value used in `<alignment horizontal="...">`
    pub fn as_xlsx_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Fill => "fill",
            HorizontalAlignment::Justify => "justify",
            HorizontalAlignment::CenterContinuous => "centerContinuous",
            HorizontalAlignment::Distributed => "distributed",
        }
    }

    /// Parse an attribute value
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "general" => Some(HorizontalAlignment::General),
            "left" => Some(HorizontalAlignment::Left),
            "center" => Some(HorizontalAlignment::Center),
            "right" => Some(HorizontalAlignment::Right),
            "fill" => Some(HorizontalAlignment::Fill),
            "justify" => Some(HorizontalAlignment::Justify),
            "centerContinuous" => Some(HorizontalAlignment::CenterContinuous),
            "distributed" => Some(HorizontalAlignment::Distributed),
            _ => None,
        }
    }
}

/// Vertical alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlignment {
    /// Attribute value used in `<alignment vertical="...">`
    pub fn as_xlsx_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Justify => "justify",
            VerticalAlignment::Distributed => "distributed",
        }
    }

    /// Parse an attribute value
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "top" => Some(VerticalAlignment::Top),
            "center" => Some(VerticalAlignment::Center),
            "bottom" => Some(VerticalAlignment::Bottom),
            "justify" => Some(VerticalAlignment::Justify),
            "distributed" => Some(VerticalAlignment::Distributed),
            _ => None,
        }
    }
}

/// Font attributes to override
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontPatch {
    pub bold: Option<bool>,
    /// Size in points
    pub size: Option<f64>,
}

/// Alignment attributes to override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentPatch {
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
}

/// A set of format changes for one cell
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellFormat {
    pub number_format: Option<NumberFormat>,
    pub font: Option<FontPatch>,
    pub alignment: Option<AlignmentPatch>,
}

impl CellFormat {
    /// Create an empty format change
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number format
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = Some(format);
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.get_or_insert_with(FontPatch::default).bold = Some(bold);
        self
    }

    /// Set the font size in points
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font.get_or_insert_with(FontPatch::default).size = Some(size);
        self
    }

    /// Set horizontal alignment
    pub fn with_horizontal(mut self, align: HorizontalAlignment) -> Self {
        self.alignment
            .get_or_insert_with(AlignmentPatch::default)
            .horizontal = Some(align);
        self
    }

    /// Set vertical alignment
    pub fn with_vertical(mut self, align: VerticalAlignment) -> Self {
        self.alignment
            .get_or_insert_with(AlignmentPatch::default)
            .vertical = Some(align);
        self
    }

    /// Whether this format changes nothing
    pub fn is_empty(&self) -> bool {
        self.number_format.is_none() && self.font.is_none() && self.alignment.is_none()
    }
}
