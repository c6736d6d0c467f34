//! text emission
//!
//! Everything that spans more than one line goes through [Emitter]. Indentation is two spaces per nesting level and
//! is derived from where a node sits while the tree is walked, never stored on the node itself.
//!
//! For a delimited block (object or array) whose opening line sits at level `L`:
//! - every child goes on its own line, indented `2 * (L + 1)` spaces
//! - the closing delimiter is indented `2 * L` spaces
//! - a block without children renders as its bare delimiter pair (`{}`, `[]`)
use std::fmt::Write;

/// Spaces per nesting level
pub const INDENT_WIDTH: usize = 2;

/// Something that renders into an [Emitter]
pub trait Emit {
    fn emit(&self, emitter: &mut Emitter);

    /// Renders this node as if its first line sat at `level`
    fn render_at(&self, level: usize) -> String {
        let mut emitter = Emitter::at(level);
        self.emit(&mut emitter);
        emitter.finish()
    }
}

#[derive(Debug, Default)]
pub struct Emitter {
    out: String,
    level: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(level: usize) -> Self {
        Self {
            out: String::new(),
            level,
        }
    }

    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn write_display(&mut self, value: &impl std::fmt::Display) {
        // writing into a String does not fail
        let _ = write!(self.out, "{value}");
    }

    /// Writes a delimited block, one line per item
    ///
    /// `emit_item` is called once per item with the emitter positioned at the start of the item's line, one level
    /// deeper than the block.
    pub fn block<T>(
        &mut self,
        (open, close): (char, char),
        items: &[T],
        mut emit_item: impl FnMut(&T, &mut Emitter),
    ) {
        self.out.push(open);
        if items.is_empty() {
            self.out.push(close);
            return;
        }

        self.level += 1;
        for item in items {
            self.newline();
            emit_item(item, self);
        }
        self.level -= 1;

        self.newline();
        self.out.push(close);
    }

    /// Starts a new line indented for the current level
    pub fn newline(&mut self) {
        self.out.push('\n');
        self.indent();
    }

    fn indent(&mut self) {
        let width = self.level * INDENT_WIDTH;
        self.out.extend(std::iter::repeat(' ').take(width));
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub const OBJECT: (char, char) = ('{', '}');
pub const ARRAY: (char, char) = ('[', ']');
