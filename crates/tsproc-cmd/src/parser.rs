//! Command parser using nom
//!
//! Parses command text into structured [`ParsedCommand`] objects.
//!
//! # Supported Syntax
//!
//! - Named parameters: `Scale(TSList=AllTS,ScaleValue=2)`
//! - Quoted values: `Message(Message="Done, all good")`, with `\"` and `\\` escapes
//! - Commands without parameters: `Free()` or `Free`
//! - Comment lines starting with `#`, and `/* ... */` comment blocks
//! - Legacy syntax: `TS Alias = Name(params)` -> `Name(Alias="Alias",params)`

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, none_of, one_of, space0},
    combinator::{all_consuming, map, opt},
    multi::{fold_many0, separated_list0},
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::args::ParsedCommand;
use crate::error::ParseError;

/// One command line of a script
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// 1-based line number in the script
    pub line: usize,
    /// Command text as written
    pub text: String,
    /// Parse outcome
    pub parsed: Result<ParsedCommand, ParseError>,
}

/// Parse a single command from a string
///
/// # Example
/// ```
/// use tsproc_cmd::parse_command;
///
/// let cmd = parse_command("Scale(TSList=AllTS,ScaleValue=2)").unwrap();
/// assert_eq!(cmd.name, "Scale");
/// assert_eq!(cmd.get("ScaleValue"), Some("2"));
/// ```
pub fn parse_command(input: &str) -> Result<ParsedCommand, ParseError> {
    let normalized = normalize_legacy(input.trim());
    let input = normalized.trim();
    if input.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    check_balanced(input)?;

    let (_, (name, params)) = all_consuming(terminated(
        tuple((parse_command_name, opt(preceded(space0, parse_param_list)))),
        multispace0,
    ))(input)?;

    let mut cmd = ParsedCommand::new(name);
    for (key, value) in params.unwrap_or_default() {
        if cmd.contains(&key) {
            return Err(ParseError::DuplicateParameter(key));
        }
        cmd.params.push((key, value));
    }
    Ok(cmd)
}

/// Split a script into command lines, skipping blanks and comments
///
/// Lines that fail to parse are kept with their error so the runner can
/// report them in place.
pub fn parse_script(script: &str) -> Vec<ScriptLine> {
    let mut lines = Vec::new();
    let mut in_block = false;

    for (i, raw) in script.lines().enumerate() {
        let text = raw.trim();
        if in_block {
            if text.ends_with("*/") {
                in_block = false;
            }
            continue;
        }
        if text.starts_with("/*") {
            in_block = !text.ends_with("*/") || text.len() < 4;
            continue;
        }
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        lines.push(ScriptLine {
            line: i + 1,
            text: text.to_string(),
            parsed: parse_command(text),
        });
    }

    lines
}

/// Rewrite `TS Alias = Name(params)` as `Name(Alias="Alias",params)`
///
/// Other text is returned unchanged.
pub fn normalize_legacy(input: &str) -> String {
    let Some(rest) = input.strip_prefix("TS ") else {
        return input.to_string();
    };
    let Some((alias, command)) = rest.split_once('=') else {
        return input.to_string();
    };
    let alias = alias.trim();
    let command = command.trim();
    let Some(open) = command.find('(') else {
        return input.to_string();
    };
    if alias.is_empty() || command[..open].trim().is_empty() {
        return input.to_string();
    }

    let name = command[..open].trim();
    let body = command[open + 1..].trim_end();
    let params = body.strip_suffix(')').unwrap_or(body).trim();
    let alias = crate::args::quote_value(alias);
    if params.is_empty() {
        format!("{}(Alias={})", name, alias)
    } else {
        format!("{}(Alias={},{})", name, alias, params)
    }
}

/// Report an unclosed quote or parenthesis with its position
fn check_balanced(input: &str) -> Result<(), ParseError> {
    let mut depth: i32 = 0;
    let mut quote_start = None;
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        if quote_start.is_some() {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote_start = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => quote_start = Some(i),
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }

    if let Some(pos) = quote_start {
        return Err(ParseError::UnterminatedString(pos));
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedParens);
    }
    Ok(())
}

/// Parse a command name (alphanumeric + underscore)
fn parse_command_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Parse the parenthesized parameter list
fn parse_param_list(input: &str) -> IResult<&str, Vec<(String, String)>> {
    delimited(
        char('('),
        delimited(
            multispace0,
            separated_list0(tuple((multispace0, char(','), multispace0)), parse_param),
            multispace0,
        ),
        char(')'),
    )(input)
}

/// Parse `Key=Value`
fn parse_param(input: &str) -> IResult<&str, (String, String)> {
    map(
        separated_pair(
            parse_param_name,
            tuple((multispace0, char('='), multispace0)),
            parse_param_value,
        ),
        |(name, value)| (name.to_string(), value),
    )(input)
}

fn parse_param_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn parse_param_value(input: &str) -> IResult<&str, String> {
    alt((parse_quoted_string, parse_unquoted_value))(input)
}

/// Parse a double-quoted string with `\"` and `\\` escapes
///
/// A backslash before any other character is kept as is.
fn parse_quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                preceded(char('\\'), one_of("\"\\")),
                char('\\'),
                none_of("\"\\"),
            )),
            String::new,
            |mut s, c| {
                s.push(c);
                s
            },
        ),
        char('"'),
    )(input)
}

/// Parse an unquoted value up to the next `,` or `)`; may be empty
fn parse_unquoted_value(input: &str) -> IResult<&str, String> {
    let end = input.find(&[',', ')'][..]).unwrap_or(input.len());
    Ok((&input[end..], input[..end].trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command() {
        let cmd = parse_command("Free(TSList=AllTS)").unwrap();
        assert_eq!(cmd.name, "Free");
        assert_eq!(cmd.get("TSList"), Some("AllTS"));

        let cmd = parse_command("Free()").unwrap();
        assert_eq!(cmd.param_count(), 0);

        let cmd = parse_command("  Free  ").unwrap();
        assert_eq!(cmd.name, "Free");
    }

    #[test]
    fn test_quoted_values() {
        let cmd = parse_command(r#"Message(Message="Done, all \"good\"",CommandStatus=Warning)"#)
            .unwrap();
        assert_eq!(cmd.get("Message"), Some(r#"Done, all "good""#));
        assert_eq!(cmd.get("CommandStatus"), Some("Warning"));

        let cmd = parse_command(r#"SetProperty(PropertyName=X,PropertyValue="")"#).unwrap();
        assert_eq!(cmd.get("PropertyValue"), Some(""));

        let cmd = parse_command(r#"SetProperty(PropertyName=Dir,PropertyValue="C:\dir\\x")"#)
            .unwrap();
        assert_eq!(cmd.get("PropertyValue"), Some(r"C:\dir\x"));
        assert_eq!(parse_command(&cmd.to_string()).unwrap(), cmd);
    }

    #[test]
    fn test_whitespace_and_wildcards() {
        let cmd = parse_command("Scale( TSList = AllMatchingTSID , TSID = A* , ScaleValue = 2 )")
            .unwrap();
        assert_eq!(cmd.get("TSList"), Some("AllMatchingTSID"));
        assert_eq!(cmd.get("TSID"), Some("A*"));
        assert_eq!(cmd.get("ScaleValue"), Some("2"));
    }

    #[test]
    fn test_canonical_round_trip() {
        let text = r#"NewTimeSeries(Alias=Flow,NewTSID="Loc.USGS.Streamflow.Day",Description="Flow, daily")"#;
        let cmd = parse_command(text).unwrap();
        assert_eq!(parse_command(&cmd.to_string()).unwrap(), cmd);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(ParseError::EmptyCommand));
        assert_eq!(parse_command("Free(TSList=AllTS"), Err(ParseError::UnbalancedParens));
        assert_eq!(
            parse_command(r#"Message(Message="oops)"#),
            Err(ParseError::UnterminatedString(16))
        );
        assert_eq!(
            parse_command("Free(TSList=AllTS,TSList=SelectedTS)"),
            Err(ParseError::DuplicateParameter("TSList".to_string()))
        );
        assert!(parse_command("Free(AllTS)").is_err());
        assert!(parse_command("Free() extra").is_err());
    }

    #[test]
    fn test_legacy_syntax() {
        assert_eq!(
            normalize_legacy("TS Flow = Copy(TSID=A)"),
            "Copy(Alias=Flow,TSID=A)"
        );
        assert_eq!(normalize_legacy("TS Total = NewTimeSeries()"), "NewTimeSeries(Alias=Total)");

        let cmd = parse_command("TS Flow = Copy(TSID=A, NewTSID=B.X.Y.Day)").unwrap();
        assert_eq!(cmd.name, "Copy");
        assert_eq!(cmd.get("Alias"), Some("Flow"));
        assert_eq!(cmd.get("NewTSID"), Some("B.X.Y.Day"));
        assert_eq!(normalize_legacy("Free()"), "Free()");
    }

    #[test]
    fn test_parse_script() {
        let script = "\
# header comment
SetProperty(PropertyName=X,PropertyValue=1)

/* disabled
Free()
*/
/* one line */
Bogus(
Free(TSList=AllTS)
";
        let lines = parse_script(script);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].line, 2);
        assert!(lines[0].parsed.is_ok());
        assert_eq!(lines[1].text, "Bogus(");
        assert!(lines[1].parsed.is_err());
        assert_eq!(lines[2].line, 9);
    }
}
