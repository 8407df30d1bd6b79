use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The output buffer handed to a preallocated entry point does not
    /// have the same length as the input.
    #[error("invalid argument: input has {input} elements but output has {output}")]
    InvalidArgument { input: usize, output: usize },

    #[error("invalid kernel configuration: {0}")]
    InvalidConfig(String),
}

/// Fails with [`Error::InvalidArgument`] unless the two lengths agree.
pub(crate) fn check_lengths(output: &[f64], input: &[f64]) -> Result<()> {
    if output.len() != input.len() {
        return Err(Error::InvalidArgument {
            input: input.len(),
            output: output.len(),
        });
    }
    Ok(())
}
