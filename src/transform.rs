use crate::buffer::TextBuffer;
use crate::matcher::Rule;

/// Something that rewrites a [`TextBuffer`] in place.
///
/// Both a single [`Substitution`] and arbitrary caller logic implement this,
/// so the orchestrator drives them through the same validation and reporting
/// path. Failures are recorded on the buffer, never returned.
pub trait Transform {
    fn apply(&mut self, buffer: &mut TextBuffer);
}

impl<F> Transform for F
where
    F: FnMut(&mut TextBuffer),
{
    fn apply(&mut self, buffer: &mut TextBuffer) {
        self(buffer)
    }
}

/// One rule applied to the first or every occurrence.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub rule: Rule,
    pub global: bool,
    pub validate: bool,
}

impl Substitution {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            global: true,
            validate: true,
        }
    }
}

impl Transform for Substitution {
    fn apply(&mut self, buffer: &mut TextBuffer) {
        let Rule {
            matcher,
            replacement,
        } = &self.rule;
        if self.global {
            buffer.replace_all(matcher, replacement, self.validate);
        } else {
            buffer.replace_first(matcher, replacement, self.validate);
        }
    }
}
