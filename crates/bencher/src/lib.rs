#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    body: TestBody,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, body: TestBody) -> Self {
        Self { name, group, body }
    }

    pub fn short_lines(name: &'static str, body: TestBody) -> Self {
        Self::new(name, TestGroup::ShortLines, body)
    }

    pub fn long_lines(name: &'static str, body: TestBody) -> Self {
        Self::new(name, TestGroup::LongLines, body)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn body(&self) -> &TestBody {
        &self.body
    }
}

/// A generated text body: `line_count` lines of `line_len` chars, each followed by `terminator`.
#[derive(Debug, Copy, Clone)]
pub struct TestBody {
    line_len: usize,
    line_count: usize,
    terminator: &'static str,
}

impl TestBody {
    pub const fn new(line_len: usize, line_count: usize, terminator: &'static str) -> Self {
        Self { line_len, line_count, terminator }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn line(&self) -> String {
        "a".repeat(self.line_len)
    }

    pub fn content(&self) -> String {
        let mut content = String::with_capacity(self.byte_len());
        let line = self.line();
        for _ in 0..self.line_count {
            content.push_str(&line);
            content.push_str(self.terminator);
        }
        content
    }

    pub fn byte_len(&self) -> usize {
        (self.line_len + self.terminator.len()) * self.line_count
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    /// lines far shorter than the reader's buffer
    ShortLines,
    /// lines around the default buffer size of 1024 bytes
    LongLines,
}
