pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("markdown input is {kind}, string expected")]
    NotAString { kind: &'static str },

    #[error(transparent)]
    Sanitize(#[from] preen::Error),
}
