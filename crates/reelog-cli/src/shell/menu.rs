//! The numbered menu and what each entry does.

/// One action the shell can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Exit,
    List,
    Add,
    Delete,
    Update,
    Stats,
    Random,
    Search,
    Sort,
    GenerateWebsite,
    SwitchProfile,
    DeleteProfile,
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    SwitchProfile,
    Exit,
}

#[derive(Debug)]
pub struct MenuEntry {
    pub key: usize,
    pub label: &'static str,
    pub command: MenuCommand,
}

/// The menu, in display order. Keys are contiguous from zero.
pub static MENU: &[MenuEntry] = &[
    MenuEntry { key: 0, label: "Exit", command: MenuCommand::Exit },
    MenuEntry { key: 1, label: "List movies", command: MenuCommand::List },
    MenuEntry { key: 2, label: "Add movie", command: MenuCommand::Add },
    MenuEntry { key: 3, label: "Delete movie", command: MenuCommand::Delete },
    MenuEntry { key: 4, label: "Update movie", command: MenuCommand::Update },
    MenuEntry { key: 5, label: "Stats", command: MenuCommand::Stats },
    MenuEntry { key: 6, label: "Random movie", command: MenuCommand::Random },
    MenuEntry { key: 7, label: "Search movie", command: MenuCommand::Search },
    MenuEntry { key: 8, label: "Sort movies", command: MenuCommand::Sort },
    MenuEntry { key: 9, label: "Generate website", command: MenuCommand::GenerateWebsite },
    MenuEntry { key: 10, label: "Switch profile", command: MenuCommand::SwitchProfile },
    MenuEntry { key: 11, label: "Delete profile", command: MenuCommand::DeleteProfile },
];

/// Highest valid menu key.
pub fn max_key() -> usize {
    MENU.len().saturating_sub(1)
}

pub fn command_for(key: usize) -> Option<MenuCommand> {
    MENU.iter().find(|e| e.key == key).map(|e| e.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_contiguous() {
        for (i, entry) in MENU.iter().enumerate() {
            assert_eq!(entry.key, i);
        }
        assert_eq!(max_key(), 11);
    }

    #[test]
    fn test_command_lookup() {
        assert_eq!(command_for(0), Some(MenuCommand::Exit));
        assert_eq!(command_for(9), Some(MenuCommand::GenerateWebsite));
        assert_eq!(command_for(12), None);
    }

    #[test]
    fn test_every_command_has_one_entry() {
        let mut commands: Vec<_> = MENU.iter().map(|e| format!("{:?}", e.command)).collect();
        commands.sort();
        commands.dedup();
        assert_eq!(commands.len(), MENU.len());
    }
}
