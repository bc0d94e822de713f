/// Raw file content. Names and permissions live in the tree that points here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// True if the content looks binary: a NUL within the first 8000 bytes.
    pub fn is_binary(&self) -> bool {
        is_binary(&self.data)
    }
}

pub(crate) fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8000).any(|&b| b == 0)
}
