//! Turns raw user text into parameters the engines can trust.
//!
//! The engines assume positive sizes, sane frame counts and well-formed
//! reference strings. Checking that is done here, before anything is built.
use crate::utils::*;

pub fn parse_total(raw: &str) -> Result<Units, CtlError> {
    match raw.trim().parse::<Units>() {
        Ok(v) if v > 0  => Ok(v),
        _               => Err(CtlError::BadTotal),
    }
}

/// Comma separated, every entry a positive integer.
pub fn parse_partitions(raw: &str) -> Result<Vec<Units>, CtlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CtlError::NoPartitions);
    }
    raw.split(',')
        .map(|s| match s.trim().parse::<Units>() {
            Ok(v) if v > 0  => Ok(v),
            _               => Err(CtlError::BadPartitions),
        })
        .collect()
}

pub fn parse_owner(raw: &str) -> Result<&str, CtlError> {
    match raw.trim() {
        ""      => Err(CtlError::NoOwner),
        owner   => Ok(owner),
    }
}

pub fn parse_size(raw: &str) -> Result<Units, CtlError> {
    match raw.trim().parse::<Units>() {
        Ok(v) if v > 0  => Ok(v),
        _               => Err(CtlError::BadSize),
    }
}

pub fn check_frames(n: usize) -> Result<usize, CtlError> {
    if (1..=MAX_FRAMES).contains(&n) {
        Ok(n)
    } else {
        Err(CtlError::FramesOutOfRange)
    }
}

/// Non-negative integers, separated by any mix of whitespace and commas.
pub fn parse_references(raw: &str) -> Result<Vec<PageNum>, CtlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CtlError::NoReferences);
    }
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<PageNum>().map_err(|_| CtlError::BadReferences))
        .collect()
}

/// One line of an allocation script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `alloc <owner> <size> [policy]`
    Alloc { owner: String, size: Units, algo: Option<PlacementAlgo> },
    /// `free <owner>`
    Free { owner: String },
    /// `use <policy>`: switches the session's default policy.
    Use(PlacementAlgo),
    /// `show`: prints the block table.
    Show,
    /// `stats`
    Stats,
    /// `reset`: drops the region and rebuilds it from the layout it was configured with.
    Reset,
}

impl Command {
    /// The engine request behind the command, if it has one.
    pub fn to_request(&self) -> Option<Request> {
        match self {
            Command::Alloc { owner, size, .. }  => Some(Request::Alloc { owner: owner.clone(), size: *size }),
            Command::Free { owner }             => Some(Request::Free { owner: owner.clone() }),
            _                                   => None,
        }
    }
}

impl From<&Request> for Command {
    fn from(req: &Request) -> Self {
        match req {
            Request::Alloc { owner, size }  => Command::Alloc { owner: owner.clone(), size: *size, algo: None },
            Request::Free { owner }         => Command::Free { owner: owner.clone() },
        }
    }
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CtlError> {
    let line = line.split('#')
        .next()
        .unwrap_or_default()
        .trim();
    let words: Vec<&str> = line.split_whitespace().collect();
    let cmd = match words.as_slice() {
        []                          => return Ok(None),
        ["alloc", owner, size]      => Command::Alloc {
            owner:  parse_owner(owner)?.to_owned(),
            size:   parse_size(size)?,
            algo:   None,
        },
        ["alloc", owner, size, algo] => Command::Alloc {
            owner:  parse_owner(owner)?.to_owned(),
            size:   parse_size(size)?,
            algo:   Some(algo.parse()?),
        },
        ["alloc", ..]               => return Err(CtlError::BadSize),
        ["free", owner]             => Command::Free { owner: parse_owner(owner)?.to_owned() },
        ["free"]                    => return Err(CtlError::NoOwner),
        ["use", algo]               => Command::Use(algo.parse()?),
        ["show"]                    => Command::Show,
        ["stats"]                   => Command::Stats,
        ["reset"]                   => Command::Reset,
        _                           => return Err(CtlError::UnknownCommand(line.to_owned())),
    };

    Ok(Some(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_must_all_be_positive() {
        assert_eq!(parse_partitions(" 100, 200 ,50 "), Ok(vec![100, 200, 50]));
        assert_eq!(parse_partitions(""), Err(CtlError::NoPartitions));
        assert_eq!(parse_partitions("100,0"), Err(CtlError::BadPartitions));
        assert_eq!(parse_partitions("100,,20"), Err(CtlError::BadPartitions));
        assert_eq!(parse_partitions("100,-5"), Err(CtlError::BadPartitions));
        assert_eq!(parse_total("0"), Err(CtlError::BadTotal));
        assert_eq!(parse_total(" 512 "), Ok(512));
    }

    #[test]
    fn references_accept_mixed_separators() {
        assert_eq!(parse_references("7 0,1, 2\t0"), Ok(vec![7, 0, 1, 2, 0]));
        assert_eq!(parse_references("   "), Err(CtlError::NoReferences));
        assert_eq!(parse_references("1 -2 3"), Err(CtlError::BadReferences));
        assert_eq!(parse_references("1 two"), Err(CtlError::BadReferences));
    }

    #[test]
    fn frames_stay_in_range() {
        assert_eq!(check_frames(1), Ok(1));
        assert_eq!(check_frames(10), Ok(10));
        assert_eq!(check_frames(0), Err(CtlError::FramesOutOfRange));
        assert_eq!(check_frames(11), Err(CtlError::FramesOutOfRange));
    }

    #[test]
    fn script_lines() {
        assert_eq!(parse_command("  # just a comment"), Ok(None));
        assert_eq!(
            parse_command("alloc P1 40 best-fit  # trailing"),
            Ok(Some(Command::Alloc { owner: "P1".into(), size: 40, algo: Some(PlacementAlgo::BestFit) }))
        );
        assert_eq!(parse_command("free P1"), Ok(Some(Command::Free { owner: "P1".into() })));
        assert_eq!(parse_command("use nextFit"), Ok(Some(Command::Use(PlacementAlgo::NextFit))));
        assert_eq!(parse_command("alloc P1 0"), Err(CtlError::BadSize));
        assert_eq!(parse_command("free"), Err(CtlError::NoOwner));
        assert_eq!(
            parse_command("alloc P1 5 buddy"),
            Err(CtlError::Engine(SimError::UnknownAlgorithm("buddy".into())))
        );
        assert_eq!(parse_command("compact"), Err(CtlError::UnknownCommand("compact".into())));
    }
}
