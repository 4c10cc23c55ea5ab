pub mod constants;
pub mod render;
pub mod terminal;

/// A concrete progress surface that can execute render commands.
pub trait Surface {
    fn apply(&mut self, commands: Vec<render::UiCommand>);
}
