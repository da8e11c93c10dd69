#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Cancel,
}

/// Asks the person at the keyboard before the editor does something they
/// cannot take back.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Decision;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> Decision,
{
    fn confirm(&self, prompt: &str) -> Decision {
        self(prompt)
    }
}
