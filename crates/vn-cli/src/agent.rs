use vn_api::{load_story_from_path, StoryLoad};
use vn_core::NovelError;
use vn_runtime::ShowOutcome;

use crate::stage::LayerContent;
use crate::{
    json_string, open_session, resolve_settings, AgentArgs, AgentCommand, AssetIndex, CheckArgs,
    Session, ShowArgs,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, NovelError> {
    let lines = match args.command {
        AgentCommand::Show(args) => show_report(&args)?,
        AgentCommand::Check(args) => check_report(&args)?,
    };
    for line in lines {
        println!("{}", line);
    }
    Ok(0)
}

pub(crate) fn show_report(args: &ShowArgs) -> Result<Vec<String>, NovelError> {
    let settings = resolve_settings(&args.story)?;
    let mut session = open_session(&settings)?;
    match &args.scene {
        Some(scene_id) => {
            session.show(scene_id);
        }
        None => {
            session.start()?;
        }
    }
    session.settle();
    for index in &args.choose {
        session.choose(*index)?;
        session.settle();
    }
    report_lines(&session)
}

fn report_lines(session: &Session) -> Result<Vec<String>, NovelError> {
    let outcome = session.last_outcome().ok_or_else(|| {
        NovelError::new("CLI_NO_SCENE", "No scene has been shown.")
    })?;
    let view = session.view();
    let mut lines = vec![
        "RESULT:OK".to_string(),
        format!("SCENE:{}", outcome.scene_id()),
    ];

    lines.push(match view.front() {
        Some(slot) => match &view.layer(slot).content {
            LayerContent::Image(path) => {
                format!("BACKGROUND:{}|image:{}", slot.name(), path.display())
            }
            LayerContent::Fill(color) => format!("BACKGROUND:{}|fill:{}", slot.name(), color),
            LayerContent::Empty => format!("BACKGROUND:{}|empty", slot.name()),
        },
        None => "BACKGROUND:none".to_string(),
    });
    lines.push(format!("MUSIC_JSON:{}", to_json(&view.music)?));
    lines.push(format!("SFX_JSON:{}", to_json(&view.effect)?));

    if let ShowOutcome::Presented(presentation) = outcome {
        lines.push(format!(
            "MIX:{:.2}|{:.3}",
            presentation.mix.effect, presentation.mix.music
        ));
    }
    if !view.text.is_empty() {
        lines.push(format!("TEXT_JSON:{}", json_string(&view.text)));
    }
    for choice in &view.choices {
        lines.push(format!(
            "CHOICE:{}|{}|{}",
            choice.index,
            json_string(&choice.label),
            choice.target
        ));
    }
    lines.push(match outcome {
        ShowOutcome::NotFound(_) => "EVENT:NOT_FOUND".to_string(),
        ShowOutcome::Presented(_) if view.choices.is_empty() => "EVENT:END".to_string(),
        ShowOutcome::Presented(_) => "EVENT:CHOICES".to_string(),
    });
    if let Some(diagnostic) = &view.diagnostic {
        lines.push(format!("DIAGNOSTIC_JSON:{}", json_string(diagnostic)));
    }
    Ok(lines)
}

pub(crate) fn check_report(args: &CheckArgs) -> Result<Vec<String>, NovelError> {
    let settings = resolve_settings(&args.story)?;
    let load = load_story_from_path(&settings.table);
    let entry = load.entry_control();
    let mut lines = vec![
        "RESULT:OK".to_string(),
        format!("ENTRY:{}|{}", entry.enabled, json_string(&entry.label)),
    ];

    let story = match load {
        StoryLoad::Ready(story) => story,
        StoryLoad::Empty { skipped_rows } => {
            lines.push("SCENES:0".to_string());
            lines.push(format!("SKIPPED_ROWS:{}", skipped_rows));
            return Ok(lines);
        }
        StoryLoad::Failed(error) => return Err(error),
    };

    lines.push(format!("SCENES:{}", story.graph.len()));
    lines.push(format!("SKIPPED_ROWS:{}", story.skipped_rows));
    lines.push(format!(
        "DELIMITER_JSON:{}",
        json_string(&story.delimiter.to_string())
    ));
    if let Some(entry_id) = story.entry_id() {
        lines.push(format!("ENTRY_SCENE:{}", entry_id));
    }
    for dangling in story.graph.dangling_targets() {
        lines.push(format!("MISSING_TARGET:{}|{}", dangling.from, dangling.target));
    }

    let roots = &settings.sequencer.assets;
    let assets = AssetIndex::scan(roots);
    lines.push(format!("ASSETS:{}", assets.len()));
    for record in story.graph.records() {
        let declared = [
            record.image().map(|name| roots.image_path(name)),
            record.audio().map(|name| roots.audio_path(name)),
            record.sfx().map(|name| roots.audio_path(name)),
        ];
        for path in declared.into_iter().flatten() {
            if !assets.contains(&path) {
                lines.push(format!("MISSING_ASSET:{}|{}", record.id(), path.display()));
            }
        }
    }
    Ok(lines)
}

fn to_json(value: &impl serde::Serialize) -> Result<String, NovelError> {
    serde_json::to_string(value)
        .map_err(|error| NovelError::new("CLI_REPORT_JSON", error.to_string()))
}
