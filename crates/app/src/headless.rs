use std::path::{Path, PathBuf};
use std::process;

use furnish_core::{
    build_plan, document_from_session, footprint_for, preset, read_design_file, visible_walls,
    CameraAngle, EditorSession, EditorSettings, InteractionController,
};

use crate::thumbnail::render_plan_thumbnail;

/// Image pixels per plan pixel in exported thumbnails.
const THUMBNAIL_SCALE: f32 = 0.5;

#[derive(Debug, Default, PartialEq)]
struct HeadlessArgs {
    design_path: Option<PathBuf>,
    angle: Option<CameraAngle>,
    thumbnail_path: Option<PathBuf>,
    save_path: Option<PathBuf>,
    print: bool,
    help: bool,
}

/// Value following `name` on the command line, if any.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|index| args.get(index + 1))
        .cloned()
}

pub fn maybe_run_headless(args: &[String], settings: &EditorSettings) -> Result<bool, String> {
    if !args
        .iter()
        .any(|arg| arg == "--headless" || arg == "-headless")
    {
        return Ok(false);
    }

    let parsed = parse_headless_args(args)?;
    if parsed.help {
        print_headless_help();
        process::exit(0);
    }

    let session = match &parsed.design_path {
        Some(path) => {
            let document = read_design_file(path).map_err(|err| err.to_string())?;
            tracing::info!("headless: loaded {:?}", path);
            EditorSession::from_document(document)
        }
        None => EditorSession::new(settings.default_room.clone()),
    };
    let mut controller = InteractionController::new(session);
    let angle = parsed.angle.unwrap_or(CameraAngle::Top);
    controller.set_camera_angle(angle);
    report(controller.session(), angle);

    if let Some(path) = &parsed.thumbnail_path {
        controller.set_camera_angle(CameraAngle::Top);
        write_thumbnail(controller.session(), path)?;
        tracing::info!("headless: wrote thumbnail to {:?}", path);
    }

    let session = controller.session();
    let document = document_from_session(session, session.design_name());
    if let Some(path) = &parsed.save_path {
        let data = serde_json::to_vec_pretty(&document).map_err(|err| err.to_string())?;
        std::fs::write(path, data).map_err(|err| err.to_string())?;
        tracing::info!("headless: saved design to {:?}", path);
    }

    if parsed.print {
        let json = serde_json::to_string_pretty(&document).map_err(|err| err.to_string())?;
        println!("{json}");
    }

    tracing::info!("headless: completed");
    Ok(true)
}

fn parse_headless_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut parsed = HeadlessArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str, what: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} requires {what}"))
        };
        match arg.as_str() {
            "--headless" | "-headless" => {}
            "--design-file" => parsed.design_path = Some(value(arg, "a path")?.into()),
            "--angle" => {
                let name = value(arg, "an angle name")?;
                let angle = CameraAngle::from_name(&name)
                    .ok_or_else(|| format!("unknown camera angle {name}"))?;
                parsed.angle = Some(angle);
            }
            "--thumbnail" => parsed.thumbnail_path = Some(value(arg, "a path")?.into()),
            "--save" => parsed.save_path = Some(value(arg, "a path")?.into()),
            "--print" => parsed.print = true,
            "--help" | "-h" => parsed.help = true,
            _ => {}
        }
    }

    Ok(parsed)
}

const ANGLE_NAMES: &str = "front|left|right|top|corner";

fn print_headless_help() {
    println!(
        "Headless mode options:\n  --headless | -headless\n  --design-file <path>\n  --angle <{ANGLE_NAMES}>\n  --thumbnail <png>\n  --save <path>\n  --print\n  --config <path>"
    );
}

fn report(session: &EditorSession, angle: CameraAngle) {
    let room = session.room();
    println!(
        "{}: {} x {} x {} m, {} items",
        session.design_name(),
        room.width,
        room.length,
        room.height,
        session.items().len()
    );
    for item in session.items() {
        let footprint = footprint_for(&item.kind);
        println!(
            "  {} ({}) at ({:.2}, {:.2}) footprint {} x {}",
            item.id, item.kind, item.position.x, item.position.z, footprint.width, footprint.depth
        );
    }
    let camera = preset(angle, room);
    let walls: Vec<_> = visible_walls(room, &camera.hidden_walls)
        .into_iter()
        .map(|wall| wall.id)
        .collect();
    tracing::info!("headless: {} view shows walls {:?}", angle.label(), walls);
}

fn write_thumbnail(session: &EditorSession, path: &Path) -> Result<(), String> {
    let plan = build_plan(session);
    let canvas = plan
        .canvas()
        .ok_or_else(|| "plan view unavailable for thumbnail".to_string())?;
    render_plan_thumbnail(canvas, THUMBNAIL_SCALE)
        .save(path)
        .map_err(|err| format!("failed to write {:?}: {err}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_thumbnail_run() {
        let parsed = parse_headless_args(&args(&[
            "furnish",
            "--headless",
            "--design-file",
            "lounge.json",
            "--angle",
            "front",
            "--thumbnail",
            "lounge.png",
            "--print",
        ]))
        .expect("parse");
        assert_eq!(parsed.design_path, Some(PathBuf::from("lounge.json")));
        assert_eq!(parsed.angle, Some(CameraAngle::Front));
        assert_eq!(parsed.thumbnail_path, Some(PathBuf::from("lounge.png")));
        assert!(parsed.print);
        assert!(parsed.save_path.is_none());
    }

    #[test]
    fn rejects_missing_values_and_unknown_angles() {
        assert!(parse_headless_args(&args(&["furnish", "--headless", "--save"])).is_err());
        assert!(parse_headless_args(&args(&["furnish", "--angle", "sideways"])).is_err());
    }

    #[test]
    fn help_lists_every_camera_angle() {
        let listed: Vec<_> = ANGLE_NAMES
            .split('|')
            .map(|name| CameraAngle::from_name(name).expect("listed angle parses"))
            .collect();
        assert_eq!(listed, CameraAngle::ALL.to_vec());
    }

    #[test]
    fn flag_value_reads_the_next_argument() {
        let list = args(&["furnish", "--config", "alt.json", "--design"]);
        assert_eq!(flag_value(&list, "--config"), Some("alt.json".to_string()));
        assert_eq!(flag_value(&list, "--design"), None);
        assert_eq!(flag_value(&list, "--missing"), None);
    }

    #[test]
    fn headless_run_saves_and_renders_thumbnail() {
        let dir = tempfile::tempdir().expect("tempdir");
        let design = dir.path().join("study.json");
        std::fs::write(
            &design,
            r#"{"name":"Study","roomSpecs":{"width":4,"length":3,"height":2.5},
                "furniture":[{"type":"desk1","position":{"x":0.5,"y":0,"z":-0.5}}]}"#,
        )
        .expect("seed");
        let saved = dir.path().join("out.json");
        let thumb = dir.path().join("study.png");
        let list = args(&[
            "furnish",
            "--headless",
            "--design-file",
            design.to_str().expect("utf8"),
            "--angle",
            "left",
            "--thumbnail",
            thumb.to_str().expect("utf8"),
            "--save",
            saved.to_str().expect("utf8"),
        ]);

        assert_eq!(maybe_run_headless(&list, &EditorSettings::default()), Ok(true));
        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&saved).expect("read")).expect("json");
        assert_eq!(written["name"], "Study");
        assert_eq!(written["furniture"][0]["type"], "desk1");
        let image = image::open(&thumb).expect("png").to_rgba8();
        assert!(image.width() > 0 && image.height() > 0);
    }

    #[test]
    fn without_flag_the_editor_runs() {
        let list = args(&["furnish", "--design", "abc"]);
        assert_eq!(maybe_run_headless(&list, &EditorSettings::default()), Ok(false));
    }
}
