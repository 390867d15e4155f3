use anyhow::Result;

use super::super::args::LookupCommand;
use super::{
    CommandResult, CommandSummary, LookupSummary, helper::finish, release::read_artifact,
};
use crate::core::release::ReleaseKey;

/// Resolve one message in a compiled artifact. A miss is a failure, not an
/// error: callers fall back to the source text.
pub fn lookup(cmd: LookupCommand) -> Result<CommandResult> {
    let artifact = read_artifact(&cmd.artifact)?;

    let key = match &cmd.id {
        Some(id) => ReleaseKey::Id(id.clone()),
        None => ReleaseKey::for_text(
            cmd.context.as_deref().unwrap_or_default(),
            cmd.source.as_deref().unwrap_or_default(),
            cmd.disambiguation.as_deref(),
        ),
    };

    let translation = artifact.lookup(&key, cmd.count).ok().map(String::from);

    Ok(finish(
        CommandSummary::Lookup(LookupSummary {
            key: key.to_string(),
            translation,
        }),
        Vec::new(),
        0,
        true,
    ))
}
