/// Submodule defining the `/funfact` command.
pub(crate) mod funfact;
/// Submodule defining the `/help` and hidden `register` commands.
pub(crate) mod help;
