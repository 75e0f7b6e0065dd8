mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_add, handle_delete, handle_edit, handle_export, handle_import, handle_list,
    handle_move, handle_reset, resolve_config,
};
