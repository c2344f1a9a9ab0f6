//! Scoreboard sidebar panels.

use super::BuilderError;

pub const MAX_SIDEBAR_LINES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarInfo {
    pub title: String,
    pub lines: Vec<String>,
}

pub trait SidebarInfoBuilder: Send {
    fn title(self: Box<Self>, title: &str) -> Box<dyn SidebarInfoBuilder>;
    fn line(self: Box<Self>, line: &str) -> Box<dyn SidebarInfoBuilder>;
    fn build(self: Box<Self>) -> Result<SidebarInfo, BuilderError>;
}

#[derive(Debug, Default)]
pub struct DefaultSidebarInfoBuilder {
    title: Option<String>,
    lines: Vec<String>,
}

impl DefaultSidebarInfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SidebarInfoBuilder for DefaultSidebarInfoBuilder {
    fn title(mut self: Box<Self>, title: &str) -> Box<dyn SidebarInfoBuilder> {
        self.title = Some(title.to_string());
        self
    }

    fn line(mut self: Box<Self>, line: &str) -> Box<dyn SidebarInfoBuilder> {
        self.lines.push(line.to_string());
        self
    }

    fn build(self: Box<Self>) -> Result<SidebarInfo, BuilderError> {
        let title = self
            .title
            .filter(|value| !value.trim().is_empty())
            .ok_or(BuilderError::MissingField("title"))?;
        if self.lines.len() > MAX_SIDEBAR_LINES {
            return Err(BuilderError::OutOfRange {
                field: "lines",
                value: self.lines.len(),
                max: MAX_SIDEBAR_LINES,
            });
        }
        Ok(SidebarInfo {
            title,
            lines: self.lines,
        })
    }
}
