use std::error::Error;

#[derive(Debug)]
pub struct SourceFailure;

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source observable failed")
    }
}

impl Error for SourceFailure {}

#[derive(Debug)]
pub struct TransformFailure(pub u32);

impl std::fmt::Display for TransformFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot transform value {}", self.0)
    }
}

impl Error for TransformFailure {}
