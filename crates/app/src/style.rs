//! Edit pane text styling
//!
//! Styling only changes how the edit pane draws its text. Nothing here is
//! written into the PDF.

use eframe::egui;

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 72;
pub const DEFAULT_FONT_SIZE: u32 = 12;

/// Font families offered by the font selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamilyChoice {
    #[default]
    Proportional,
    Monospace,
}

impl FontFamilyChoice {
    pub const ALL: [FontFamilyChoice; 2] =
        [FontFamilyChoice::Proportional, FontFamilyChoice::Monospace];

    pub fn label(&self) -> &'static str {
        match self {
            FontFamilyChoice::Proportional => "Sans",
            FontFamilyChoice::Monospace => "Monospace",
        }
    }

    pub fn to_egui(self) -> egui::FontFamily {
        match self {
            FontFamilyChoice::Proportional => egui::FontFamily::Proportional,
            FontFamilyChoice::Monospace => egui::FontFamily::Monospace,
        }
    }
}

/// Current formatting of the edit pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub family: FontFamilyChoice,
    size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::with_size(DEFAULT_FONT_SIZE)
    }
}

impl TextStyle {
    /// Plain style at `size` points, clamped to the supported range
    pub fn with_size(size: u32) -> Self {
        Self {
            family: FontFamilyChoice::default(),
            size: clamp_font_size(size),
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Set the font size, clamped to the supported range
    pub fn set_size(&mut self, size: u32) {
        self.size = clamp_font_size(size);
    }

    pub fn font_id(&self) -> egui::FontId {
        egui::FontId::new(self.size as f32, self.family.to_egui())
    }

    /// Text format for the edit pane.
    ///
    /// egui has no synthetic bold, so bold text is drawn in the theme's
    /// strong text colour instead.
    pub fn text_format(&self, visuals: &egui::Visuals) -> egui::TextFormat {
        let color = if self.bold { visuals.strong_text_color() } else { visuals.text_color() };
        let underline = if self.underline {
            egui::Stroke::new(1.0, color)
        } else {
            egui::Stroke::NONE
        };

        egui::TextFormat {
            font_id: self.font_id(),
            color,
            italics: self.italic,
            underline,
            ..Default::default()
        }
    }
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}
