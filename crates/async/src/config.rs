// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, ExpectedValue, Result};
use s7tag_core::TagDescriptor;
use std::{env, fs, time::Duration};

/// PLC host name or address
pub const ENV_HOST: &str = "S7TAG_HOST";
/// rack of the CPU
pub const ENV_RACK: &str = "S7TAG_RACK";
/// slot of the CPU
pub const ENV_SLOT: &str = "S7TAG_SLOT";
/// number of read cycles
pub const ENV_CYCLES: &str = "S7TAG_CYCLES";
/// milliseconds between read cycles
pub const ENV_CYCLE_TIME: &str = "S7TAG_CYCLE_TIME_MS";
/// tag lines, `address | type;value`
pub const ENV_TAGS: &str = "S7TAG_TAGS";
/// file holding tag lines, used when [`ENV_TAGS`] is not set
pub const ENV_TAGS_FILE: &str = "S7TAG_TAGS_FILE";

/// a tag to read and the value it must hold
#[derive(Debug, Clone)]
pub struct TagSpec {
    /// tag name, `tag-<n>` counting from 1
    pub name: String,
    /// address as configured
    pub address: String,
    /// parsed address
    pub tag: TagDescriptor,
    /// value the tag must hold
    pub expected: ExpectedValue,
}

/// benchmark scenario: where to connect, how often to read and what to expect
///
/// # Examples
/// ```rust
/// use s7tag_async::Scenario;
/// use std::time::Duration;
///
/// let scenario = Scenario::new(10, Duration::from_millis(100))
///     .with_host("192.168.0.1")
///     .with_tags(
///         "%DB4:0.0:BOOL | boolean;true
///          %DB4:46:REAL  | float;3.141593",
///     )
///     .unwrap();
/// assert_eq!(scenario.tags().len(), 2);
/// assert_eq!(scenario.tags()[1].name, "tag-2");
/// ```
#[derive(Debug, Clone)]
pub struct Scenario {
    host: Option<String>,
    rack: Option<u16>,
    slot: Option<u16>,
    num_cycles: usize,
    cycle_time: Duration,
    tags: Vec<TagSpec>,
}

impl Scenario {
    /// scenario without tags
    pub fn new(num_cycles: usize, cycle_time: Duration) -> Self {
        Self {
            host: None,
            rack: None,
            slot: None,
            num_cycles,
            cycle_time,
            tags: vec![],
        }
    }

    /// set PLC host
    #[inline]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// set rack & slot of the CPU
    #[inline]
    pub fn with_rack_slot(mut self, rack: u16, slot: u16) -> Self {
        self.rack = Some(rack);
        self.slot = Some(slot);
        self
    }

    /// add tags from lines of `address | type;value`
    #[inline]
    pub fn with_tags(mut self, text: &str) -> Result<Self> {
        for (address, expected) in parse_tags(text)? {
            self.add(address, expected);
        }
        Ok(self)
    }

    /// add a single tag
    pub fn tag(mut self, address: &str, expected: &str) -> Result<Self> {
        let (address, expected) = parse_pair(address, expected)?;
        self.add(address, expected);
        Ok(self)
    }

    /// a repeated address replaces the expected value of the earlier entry
    fn add(&mut self, (address, tag): (String, TagDescriptor), expected: ExpectedValue) {
        if let Some(spec) = self.tags.iter_mut().find(|spec| spec.address == address) {
            spec.expected = expected;
            return;
        }
        let name = format!("tag-{}", self.tags.len() + 1);
        self.tags.push(TagSpec {
            name,
            address,
            tag,
            expected,
        });
    }

    /// load from `S7TAG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// load from a key-value source; see the `ENV_*` constants for keys.
    /// rack & slot of `-1` are treated as missing, as are cycles & cycle time,
    /// which are required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| -> Result<Option<i64>> {
            match lookup(key) {
                Some(v) => {
                    let v: i64 = v.trim().parse().map_err(|_| {
                        Error::config(format!("{} is not an integer: `{}`", key, v))
                    })?;
                    Ok(if v == -1 { None } else { Some(v) })
                }
                None => Ok(None),
            }
        };
        let bounded = |key: &str, max: i64| -> Result<Option<i64>> {
            match number(key)? {
                Some(v) if v < 0 || v > max => {
                    Err(Error::config(format!("{} out of range [0-{}]: {}", key, max, v)))
                }
                v => Ok(v),
            }
        };

        let num_cycles = bounded(ENV_CYCLES, i64::from(u32::MAX))?
            .ok_or_else(|| Error::config(format!("{} required", ENV_CYCLES)))?;
        let cycle_time = bounded(ENV_CYCLE_TIME, i64::from(u32::MAX))?
            .ok_or_else(|| Error::config(format!("{} required", ENV_CYCLE_TIME)))?;
        let mut scenario = Scenario::new(
            num_cycles as usize,
            Duration::from_millis(cycle_time as u64),
        );
        scenario.host = lookup(ENV_HOST).filter(|v| !v.trim().is_empty());
        scenario.rack = bounded(ENV_RACK, i64::from(u16::MAX))?.map(|v| v as u16);
        scenario.slot = bounded(ENV_SLOT, i64::from(u16::MAX))?.map(|v| v as u16);

        let text = match (lookup(ENV_TAGS), lookup(ENV_TAGS_FILE)) {
            (Some(text), _) => text,
            (None, Some(path)) => fs::read_to_string(&path)
                .map_err(|e| Error::config(format!("failed to read {}: {}", path, e)))?,
            (None, None) => String::new(),
        };
        let scenario = scenario.with_tags(&text)?;
        debug!(
            "scenario: {} tags, {} cycles, {}ms intervals",
            scenario.tags.len(),
            scenario.num_cycles,
            scenario.cycle_time.as_millis()
        );
        Ok(scenario)
    }

    /// PLC host
    #[inline]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// rack of the CPU
    #[inline]
    pub fn rack(&self) -> Option<u16> {
        self.rack
    }

    /// slot of the CPU
    #[inline]
    pub fn slot(&self) -> Option<u16> {
        self.slot
    }

    /// number of read cycles
    #[inline]
    pub fn num_cycles(&self) -> usize {
        self.num_cycles
    }

    /// interval between read cycles
    #[inline]
    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    /// tags in configuration order
    #[inline]
    pub fn tags(&self) -> &[TagSpec] {
        &self.tags
    }
}

/// parse lines of `address | type;value`;
/// lines that do not split into exactly two fields are skipped.
fn parse_tags(text: &str) -> Result<Vec<((String, TagDescriptor), ExpectedValue)>> {
    let mut res = vec![];
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        let fields: Vec<_> = line.split('|').collect();
        if fields.len() != 2 {
            if !line.is_empty() {
                trace!("skip line {}: {}", n + 1, line);
            }
            continue;
        }
        let pair = parse_pair(fields[0], fields[1])
            .map_err(|e| Error::config(format!("line {} `{}`: {}", n + 1, line, e)))?;
        res.push(pair);
    }
    Ok(res)
}

fn parse_pair(address: &str, expected: &str) -> Result<((String, TagDescriptor), ExpectedValue)> {
    let address = address.trim();
    let tag: TagDescriptor = address.parse()?;
    let expected = ExpectedValue::parse(expected.trim())?;
    Ok(((address.to_owned(), tag), expected))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_parse_tags() -> anyhow::Result<()> {
        let text = "
            %DB4:0.0:BOOL | boolean;true
            not a tag line
            %DB4:6:INT | int;-42 | extra
            %DB4:140:STRING(10) | string;hurz
        ";
        let tags = parse_tags(text)?;
        assert_eq!(tags.len(), 2);
        assert_eq!((tags[0].0).0, "%DB4:0.0:BOOL");
        assert_eq!(tags[1].1, ExpectedValue::Text("hurz".into()));
        Ok(())
    }

    #[test]
    fn test_parse_tags_names_line() {
        let err = parse_tags("%DB4:0:INT | int;1\n%DB4:1:FOOBAR | int;1").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "{}", msg);
        assert!(msg.contains("FOOBAR"), "{}", msg);
    }

    #[test]
    fn test_repeated_address() -> anyhow::Result<()> {
        let scenario = Scenario::new(1, Duration::from_millis(10))
            .tag("%DB4:6:INT", "int;1")?
            .tag("%DB4:8:INT", "int;2")?
            .tag("%DB4:6:INT", "int;3")?;
        assert_eq!(scenario.tags().len(), 2);
        assert_eq!(scenario.tags()[0].name, "tag-1");
        assert_eq!(scenario.tags()[0].expected, ExpectedValue::Int(3));
        Ok(())
    }

    #[test]
    fn test_from_lookup() -> anyhow::Result<()> {
        let scenario = Scenario::from_lookup(lookup(&[
            (ENV_HOST, "10.0.0.5"),
            (ENV_RACK, "0"),
            (ENV_SLOT, "-1"),
            (ENV_CYCLES, "20"),
            (ENV_CYCLE_TIME, "100"),
            (ENV_TAGS, "%DB4:46:REAL | float;3.141593"),
        ]))?;
        assert_eq!(scenario.host(), Some("10.0.0.5"));
        assert_eq!(scenario.rack(), Some(0));
        assert_eq!(scenario.slot(), None);
        assert_eq!(scenario.num_cycles(), 20);
        assert_eq!(scenario.cycle_time(), Duration::from_millis(100));
        assert_eq!(scenario.tags().len(), 1);
        Ok(())
    }

    #[test]
    fn test_from_lookup_required() {
        let err = Scenario::from_lookup(lookup(&[(ENV_CYCLE_TIME, "100")])).unwrap_err();
        assert!(err.to_string().contains(ENV_CYCLES));
        let err =
            Scenario::from_lookup(lookup(&[(ENV_CYCLES, "-1"), (ENV_CYCLE_TIME, "100")]))
                .unwrap_err();
        assert!(err.to_string().contains(ENV_CYCLES));
        let err = Scenario::from_lookup(lookup(&[(ENV_CYCLES, "x"), (ENV_CYCLE_TIME, "100")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = Scenario::from_lookup(lookup(&[
            (ENV_CYCLES, "1"),
            (ENV_CYCLE_TIME, "100"),
            (ENV_RACK, "70000"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_RACK));
    }
}
