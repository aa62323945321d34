// ============================================================================
// GESTURE SCRIPTS — line-oriented event recordings for headless replay
// ============================================================================
//
// One event per line, `#` starts a comment:
//
//   tool select
//   color #ff8800
//   drag 2 2 5 5        # down, move, up
//   click 3 3           # down + up on the same cell
//   down 0 0
//   move 4 4
//   up 4 4
//   copy | paste | delete | clear | undo | enter | escape
//   resize 64
//   grid 8
//   key ctrl+z

use crate::canvas::Cell;
use crate::components::colors::parse_hex;
use crate::components::tools::Tool;
use crate::error::ScriptError;
use crate::events::{Command, EditorEvent};

/// Parse a whole script into the events it replays, in order.
pub fn parse_script(source: &str) -> Result<Vec<EditorEvent>, ScriptError> {
    let mut events = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let words = strip_comment(raw);
        if words.is_empty() {
            continue;
        }
        parse_line(&words, idx + 1, &mut events)?;
    }
    Ok(events)
}

/// Split a line into words, dropping everything from the first word that
/// starts with `#`. The argument of `color` is exempt so `color #ff0000`
/// keeps its value.
fn strip_comment(raw: &str) -> Vec<&str> {
    let mut words: Vec<&str> = Vec::new();
    for word in raw.split_whitespace() {
        let is_color_arg = words.len() == 1
            && (words[0].eq_ignore_ascii_case("color") || words[0].eq_ignore_ascii_case("colour"));
        if word.starts_with('#') && !is_color_arg {
            break;
        }
        words.push(word);
    }
    words
}

fn parse_line(words: &[&str], line: usize, out: &mut Vec<EditorEvent>) -> Result<(), ScriptError> {
    let err = |message: String| ScriptError { line, message };
    let Some((&op, args)) = words.split_first() else {
        return Ok(());
    };

    let ints = |want: usize| -> Result<Vec<i32>, ScriptError> {
        if args.len() != want {
            return Err(err(format!("`{}` takes {} numbers, got {}", op, want, args.len())));
        }
        args.iter()
            .map(|a| a.parse::<i32>().map_err(|_| err(format!("`{}` is not a number", a))))
            .collect()
    };
    let size = || -> Result<u32, ScriptError> {
        let v = ints(1)?;
        u32::try_from(v[0]).map_err(|_| err(format!("`{}` must not be negative", op)))
    };
    let command = |cmd: Command| -> Result<Vec<EditorEvent>, ScriptError> {
        if args.is_empty() {
            Ok(vec![EditorEvent::Command(cmd)])
        } else {
            Err(err(format!("`{}` takes no arguments", op)))
        }
    };

    let events = match op.to_ascii_lowercase().as_str() {
        "tool" => {
            let [name] = args else {
                return Err(err("`tool` takes one name".into()));
            };
            let tool: Tool = name.parse().map_err(err)?;
            vec![EditorEvent::Command(Command::SetTool(tool))]
        }
        "color" | "colour" => {
            let [hex] = args else {
                return Err(err("`color` takes one #rrggbb value".into()));
            };
            let color = parse_hex(hex).ok_or_else(|| err(format!("bad colour `{}`", hex)))?;
            vec![EditorEvent::Command(Command::SetColor(color))]
        }
        "down" => {
            let v = ints(2)?;
            vec![EditorEvent::PointerDown(Cell::new(v[0], v[1]))]
        }
        "move" => {
            let v = ints(2)?;
            vec![EditorEvent::PointerMove(Cell::new(v[0], v[1]))]
        }
        "up" => {
            let v = ints(2)?;
            vec![EditorEvent::PointerUp(Cell::new(v[0], v[1]))]
        }
        "click" => {
            let v = ints(2)?;
            let cell = Cell::new(v[0], v[1]);
            vec![EditorEvent::PointerDown(cell), EditorEvent::PointerUp(cell)]
        }
        "drag" => {
            let v = ints(4)?;
            let (from, to) = (Cell::new(v[0], v[1]), Cell::new(v[2], v[3]));
            vec![
                EditorEvent::PointerDown(from),
                EditorEvent::PointerMove(to),
                EditorEvent::PointerUp(to),
            ]
        }
        "copy" => command(Command::Copy)?,
        "paste" => command(Command::Paste)?,
        "delete" => command(Command::DeleteSelection)?,
        "clear" => command(Command::Clear)?,
        "undo" => command(Command::Undo)?,
        "enter" | "finalize" => command(Command::Finalize)?,
        "escape" | "cancel" => command(Command::Cancel)?,
        "resize" => vec![EditorEvent::Command(Command::ResizeCanvas(size()?))],
        "grid" => vec![EditorEvent::Command(Command::SetGridSpacing(size()?))],
        "key" => {
            let combo = args.join("");
            let cmd = Command::from_combo(&combo).ok_or_else(|| err(format!("no binding for `{}`", combo)))?;
            vec![EditorEvent::Command(cmd)]
        }
        other => return Err(err(format!("unknown operation `{}`", other))),
    };
    out.extend(events);
    Ok(())
}
