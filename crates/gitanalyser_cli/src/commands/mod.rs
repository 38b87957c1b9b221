pub(crate) mod git;
pub(crate) mod meta;
pub(crate) mod output;
