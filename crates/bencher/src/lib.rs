//! Fixtures shared by the archer-http benchmarks.

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    /// The whole message arrives in one read.
    pub fn single_read(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::SingleRead, file)
    }

    /// The message arrives in reads of `read_size` bytes.
    pub fn split_reads(name: &'static str, file: TestFile, read_size: usize) -> Self {
        Self::new(name, TestGroup::SplitReads { read_size }, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }

    /// The reads a transport would deliver for this case.
    pub fn reads(&self) -> Vec<&'static [u8]> {
        match self.group {
            TestGroup::SingleRead => vec![self.file.content],
            TestGroup::SplitReads { read_size } => self.file.content.chunks(read_size).collect(),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static [u8],
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static [u8]) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static [u8] {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    SingleRead,
    SplitReads { read_size: usize },
}
