//! Styled chat text.

/// Chat colors with their legacy formatting codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkRed,
    Gold,
    Gray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl TextColor {
    pub fn code(self) -> char {
        match self {
            Self::Black => '0',
            Self::DarkBlue => '1',
            Self::DarkGreen => '2',
            Self::DarkRed => '4',
            Self::Gold => '6',
            Self::Gray => '7',
            Self::Blue => '9',
            Self::Green => 'a',
            Self::Aqua => 'b',
            Self::Red => 'c',
            Self::LightPurple => 'd',
            Self::Yellow => 'e',
            Self::White => 'f',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSegment {
    pub content: String,
    pub color: Option<TextColor>,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub segments: Vec<TextSegment>,
}

impl Text {
    /// Concatenated content without styling.
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.content.as_str()).collect()
    }

    /// `§`-coded rendering understood by legacy chat clients.
    pub fn legacy(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str("§r");
            if let Some(color) = segment.color {
                out.push('§');
                out.push(color.code());
            }
            if segment.bold {
                out.push_str("§l");
            }
            if segment.italic {
                out.push_str("§o");
            }
            out.push_str(&segment.content);
        }
        out
    }
}

/// Fluent builder for [`Text`]. Style calls apply to the latest segment.
pub trait TextBuilder: Send {
    fn text(self: Box<Self>, content: &str) -> Box<dyn TextBuilder>;
    fn color(self: Box<Self>, color: TextColor) -> Box<dyn TextBuilder>;
    fn bold(self: Box<Self>) -> Box<dyn TextBuilder>;
    fn italic(self: Box<Self>) -> Box<dyn TextBuilder>;
    fn build(self: Box<Self>) -> Text;
}

#[derive(Debug, Default)]
pub struct DefaultTextBuilder {
    segments: Vec<TextSegment>,
}

impl DefaultTextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> &mut TextSegment {
        if self.segments.is_empty() {
            self.segments.push(TextSegment::default());
        }
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }
}

impl TextBuilder for DefaultTextBuilder {
    fn text(mut self: Box<Self>, content: &str) -> Box<dyn TextBuilder> {
        self.segments.push(TextSegment {
            content: content.to_string(),
            ..TextSegment::default()
        });
        self
    }

    fn color(mut self: Box<Self>, color: TextColor) -> Box<dyn TextBuilder> {
        self.current().color = Some(color);
        self
    }

    fn bold(mut self: Box<Self>) -> Box<dyn TextBuilder> {
        self.current().bold = true;
        self
    }

    fn italic(mut self: Box<Self>) -> Box<dyn TextBuilder> {
        self.current().italic = true;
        self
    }

    fn build(self: Box<Self>) -> Text {
        Text {
            segments: self.segments,
        }
    }
}
