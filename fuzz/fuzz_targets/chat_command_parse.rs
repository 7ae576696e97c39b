#![no_main]

use gitbot_command::{parse_chat_command, ActionRequest, ChatCommand, CommandCatalog, MemberAction};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let catalog = CommandCatalog::default();

    match parse_chat_command(&raw, &catalog) {
        Ok(ChatCommand::Action(ActionRequest::Member(MemberAction::Add { team, .. }))) => {
            assert!(!team.trim().is_empty());
            assert!(!catalog.is_protected_team(&team));
        }
        Ok(_) => {}
        Err(error) => {
            assert!(!error.to_string().trim().is_empty());
        }
    }
});
