pub(crate) mod ascii;
pub(crate) mod iterm;
