use super::shell::ShellId;

slotmap::new_key_type! {
    pub struct SolidId;
}

/// A closed volume: one outer boundary and any number of voids.
#[derive(Debug, Clone)]
pub struct SolidData {
    pub outer_shell: ShellId,
    /// Void boundaries.
    pub inner_shells: Vec<ShellId>,
}

impl SolidData {
    /// Outer shell first, then voids.
    pub fn shells(&self) -> impl Iterator<Item = ShellId> + '_ {
        std::iter::once(self.outer_shell).chain(self.inner_shells.iter().copied())
    }
}
