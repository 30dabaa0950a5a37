use crate::dispatch::{EncodedSymbol, Selector, encode_card};
use crate::encoding::EncodeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

const WALLET_VERSION: u8 = 1;
pub const MAX_CARDS: usize = 7;
pub const DEFAULT_COLOR: &str = "#12D612";

/// Named colors offered for cards.
pub const PALETTE: [(&str, &str); 10] = [
    ("red", "#FF4949"),
    ("orange", "#FEB300"),
    ("yellow", "#DAD700"),
    ("lime", "#25FF86"),
    ("green", "#12D612"),
    ("light-blue", "#6FD4ED"),
    ("blue", "#535BFF"),
    ("purple", "#FF40FF"),
    ("brown", "#C6643E"),
    ("grey", "#808080"),
];

/// Resolve a palette name or a literal `#RRGGBB` value to a normalized color.
pub fn resolve_color(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if let Some((_, hex)) = PALETTE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*hex).to_string());
    }
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(format!("#{}", hex.to_ascii_uppercase()));
    }
    Err(anyhow!(
        "color '{}' is neither #RRGGBB nor a palette name",
        input
    ))
}

/// Single card stored in a wallet file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    #[serde(default)]
    pub name: String,
    pub code: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub selector: Selector,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Card {
    /// Build a card from user input: name and code are trimmed, the code must
    /// not be empty and the color defaults to green.
    pub fn new<N: Into<String>, C: Into<String>>(
        name: N,
        code: C,
        color: Option<&str>,
        selector: Selector,
    ) -> Result<Self> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(anyhow!("card code must not be empty"));
        }
        let color = match color {
            Some(c) => resolve_color(c)?,
            None => default_color(),
        };
        Ok(Self {
            name: name.into().trim().to_string(),
            code,
            color,
            selector,
        })
    }

    pub fn encode(&self) -> Result<EncodedSymbol, EncodeError> {
        encode_card(&self.code, self.selector)
    }
}

/// Per-wallet metadata stored as a header record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletHeader {
    pub version: u8,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub bright: bool,
    #[serde(default)]
    pub history: Vec<AuditEvent>,
}

impl WalletHeader {
    pub fn new() -> Self {
        Self {
            version: WALLET_VERSION,
            saved_at: Utc::now(),
            bright: false,
            history: Vec::new(),
        }
    }
}

impl Default for WalletHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Describes how the wallet has changed over time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
}

impl AuditEvent {
    /// Create an audit entry using the OS user (if available).
    pub fn new<S: Into<String>>(action: S) -> Self {
        let actor = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            timestamp: Utc::now(),
            actor,
            action: action.into(),
        }
    }
}

/// Portable backup document: `{"barcodes": [...], "bright": bool}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    pub barcodes: Vec<BackupEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bright: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Accepts a number or a numeric string; anything else reads as `None`.
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient_type_code",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_code: Option<u8>,
}

impl BackupEntry {
    /// Color to store for this entry: the normalized value when it is a valid
    /// color, the default otherwise.
    pub fn resolved_color(&self) -> String {
        self.color
            .as_deref()
            .and_then(|c| resolve_color(c).ok())
            .unwrap_or_else(default_color)
    }

    /// True when a color was given but cannot be used.
    pub fn has_invalid_color(&self) -> bool {
        self.color
            .as_deref()
            .is_some_and(|c| resolve_color(c).is_err())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeCode {
    Number(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

fn lenient_type_code<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawTypeCode>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTypeCode::Number(n)) => u8::try_from(n).ok(),
        Some(RawTypeCode::Float(f)) if f.is_finite() && f >= 0.0 && f < 256.0 => Some(f as u8),
        Some(RawTypeCode::Text(text)) => {
            let digits: String = text
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

/// In-memory representation of a wallet file.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub header: WalletHeader,
    pub cards: Vec<Card>,
    pub path: Option<PathBuf>,
}

impl Wallet {
    pub fn new(header: WalletHeader) -> Self {
        Self {
            header,
            cards: Vec::new(),
            path: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("failed to open wallet file {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let header_line = lines
            .next()
            .ok_or_else(|| anyhow!("wallet file {} is empty", path.display()))??;
        let header = match serde_json::from_str::<WalletLine>(&header_line)
            .with_context(|| format!("failed to parse wallet header in {}", path.display()))?
        {
            WalletLine::Header(header) => header,
            WalletLine::Card(_) => return Err(anyhow!("expected wallet header as first line")),
        };

        let mut cards = Vec::new();
        for (idx, raw) in lines.enumerate() {
            let raw = raw?;
            if raw.trim().is_empty() {
                continue;
            }
            let line: WalletLine = serde_json::from_str(&raw).with_context(|| {
                format!(
                    "failed to parse card record at line {} in {}",
                    idx + 2,
                    path.display()
                )
            })?;
            match line {
                WalletLine::Header(_) => {
                    return Err(anyhow!(
                        "multiple wallet headers found in {} at line {}",
                        path.display(),
                        idx + 2
                    ));
                }
                WalletLine::Card(card) => cards.push(card),
            }
        }
        if cards.len() > MAX_CARDS {
            return Err(anyhow!(
                "wallet {} holds {} cards; at most {} are supported",
                path.display(),
                cards.len(),
                MAX_CARDS
            ));
        }

        Ok(Self {
            header,
            cards,
            path: Some(path.to_path_buf()),
        })
    }

    /// Write the wallet, stamping `saved_at` with the current time.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.header.saved_at = Utc::now();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to write wallet file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_lines(&mut writer)?;
        writer.flush()?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn write_lines<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *writer, &WalletLine::Header(self.header.clone()))
            .context("failed to serialize wallet header")?;
        writer.write_all(b"\n")?;
        for card in &self.cards {
            serde_json::to_writer(&mut *writer, &WalletLine::Card(card.clone()))
                .context("failed to serialize wallet card")?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= MAX_CARDS
    }

    pub fn append_card(&mut self, card: Card) -> Result<()> {
        self.ensure_capacity()?;
        self.cards.push(card);
        Ok(())
    }

    pub fn insert_card(&mut self, index: usize, card: Card) -> Result<()> {
        if index > self.cards.len() {
            return Err(anyhow!(
                "card index {} out of range 0..={}",
                index,
                self.cards.len()
            ));
        }
        self.ensure_capacity()?;
        self.cards.insert(index, card);
        Ok(())
    }

    /// Replace a card at the specified zero-based index.
    pub fn replace_card(&mut self, index: usize, card: Card) -> Result<Card> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.cards[index], card))
    }

    pub fn remove_card(&mut self, index: usize) -> Result<Card> {
        self.check_index(index)?;
        Ok(self.cards.remove(index))
    }

    /// Move a card so that it ends up at `to`, shifting the others.
    pub fn move_card(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let card = self.cards.remove(from);
        self.cards.insert(to, card);
        Ok(())
    }

    /// Step the selection forwards (`step > 0`) or backwards, wrapping at
    /// both ends. Returns `None` for an empty wallet.
    pub fn cycle(&self, selected: usize, step: isize) -> Option<usize> {
        let len = self.cards.len() as isize;
        if len == 0 {
            return None;
        }
        let current = (selected as isize).clamp(0, len - 1);
        Some((current + step).rem_euclid(len) as usize)
    }

    pub fn get(&self, index: usize) -> Result<&Card> {
        self.check_index(index)?;
        Ok(&self.cards[index])
    }

    pub fn encode_card(&self, index: usize) -> Result<EncodedSymbol> {
        let card = self.get(index)?;
        card.encode()
            .with_context(|| format!("card {} ('{}') cannot be encoded", index + 1, card.name))
    }

    /// Compute a SHA-256 hash representing wallet contents.
    pub fn hash(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        let mut buffer = Vec::new();
        self.write_lines(&mut buffer)
            .context("failed to hash wallet contents")?;
        hasher.update(&buffer);
        let digest = hasher.finalize();
        Ok(format!("{digest:02x}"))
    }

    /// Append an audit log entry.
    pub fn log_action<S: Into<String>>(&mut self, action: S) {
        self.header.history.push(AuditEvent::new(action));
    }

    /// Human-readable age of the last save, empty after a day.
    pub fn saved_ago(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.header.saved_at).num_seconds();
        if secs < 60 {
            "Saved now!".to_string()
        } else if secs < 60 * 60 {
            format!("Saved {} minute(s) ago", secs / 60)
        } else if secs < 24 * 60 * 60 {
            format!("Saved {} hour(s) ago", secs / (60 * 60))
        } else {
            String::new()
        }
    }

    pub fn export_backup(&self) -> Result<String> {
        let backup = Backup {
            barcodes: self
                .cards
                .iter()
                .map(|card| BackupEntry {
                    name: card.name.clone(),
                    code: card.code.clone(),
                    color: Some(card.color.clone()),
                    type_code: Some(card.selector.type_code()),
                })
                .collect(),
            bright: Some(self.header.bright),
        };
        serde_json::to_string_pretty(&backup).context("failed to serialize backup")
    }

    /// Replace every card with the contents of a backup document. Only the
    /// first [`MAX_CARDS`] entries are considered; among those, entries
    /// without a code are skipped and unusable colors fall back to the
    /// default. Returns the number of cards imported.
    pub fn import_backup(&mut self, json: &str) -> Result<usize> {
        let backup: Backup =
            serde_json::from_str(json).context("failed to parse backup document")?;
        let mut cards = Vec::new();
        for (idx, entry) in backup.barcodes.iter().take(MAX_CARDS).enumerate() {
            if entry.code.trim().is_empty() {
                continue;
            }
            let selector = Selector::from_type_code(entry.type_code.unwrap_or(0));
            let color = entry.resolved_color();
            let card = Card::new(
                entry.name.as_str(),
                entry.code.as_str(),
                Some(color.as_str()),
                selector,
            )
            .with_context(|| format!("invalid backup entry {}", idx + 1))?;
            cards.push(card);
        }
        self.cards = cards;
        if let Some(bright) = backup.bright {
            self.header.bright = bright;
        }
        Ok(self.cards.len())
    }

    fn ensure_capacity(&self) -> Result<()> {
        if self.is_full() {
            return Err(anyhow!("wallet already holds {} cards", MAX_CARDS));
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if self.cards.is_empty() {
            return Err(anyhow!("wallet has no cards"));
        }
        if index >= self.cards.len() {
            return Err(anyhow!(
                "card index {} out of range 0..{}",
                index,
                self.cards.len().saturating_sub(1)
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WalletLine {
    Header(WalletHeader),
    Card(Card),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn card(code: &str) -> Card {
        Card::new("Store", code, None, Selector::Auto).unwrap()
    }

    #[test]
    fn card_input_is_trimmed_and_defaulted() {
        let card = Card::new("  7-Eleven ", " 12345678 ", None, Selector::Auto).unwrap();
        assert_eq!(card.name, "7-Eleven");
        assert_eq!(card.code, "12345678");
        assert_eq!(card.color, DEFAULT_COLOR);
        assert!(Card::new("x", "   ", None, Selector::Auto).is_err());
        assert!(Card::new("x", "1", Some("#nothex"), Selector::Auto).is_err());
    }

    #[test]
    fn palette_names_resolve() {
        assert_eq!(resolve_color("Purple").unwrap(), "#FF40FF");
        assert_eq!(resolve_color("#6fd4ed").unwrap(), "#6FD4ED");
        assert_eq!(resolve_color("c6643e").unwrap(), "#C6643E");
    }

    #[test]
    fn capacity_is_enforced() {
        let mut wallet = Wallet::new(WalletHeader::new());
        for i in 0..MAX_CARDS {
            wallet.append_card(card(&format!("CODE{i}"))).unwrap();
        }
        assert!(wallet.is_full());
        assert!(wallet.append_card(card("EXTRA")).is_err());
        assert!(wallet.insert_card(0, card("EXTRA")).is_err());
    }

    #[test]
    fn reorder_and_remove() {
        let mut wallet = Wallet::new(WalletHeader::new());
        for code in ["A", "B", "C"] {
            wallet.append_card(card(code)).unwrap();
        }
        wallet.move_card(2, 0).unwrap();
        let codes: Vec<&str> = wallet.cards.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
        let removed = wallet.remove_card(1).unwrap();
        assert_eq!(removed.code, "A");
        assert!(wallet.remove_card(5).is_err());
        let old = wallet.replace_card(0, card("Z")).unwrap();
        assert_eq!(old.code, "C");
        assert_eq!(wallet.cards[0].code, "Z");
    }

    #[test]
    fn cycling_wraps_in_both_directions() {
        let mut wallet = Wallet::new(WalletHeader::new());
        assert_eq!(wallet.cycle(0, 1), None);
        for code in ["A", "B", "C"] {
            wallet.append_card(card(code)).unwrap();
        }
        assert_eq!(wallet.cycle(0, -1), Some(2));
        assert_eq!(wallet.cycle(2, 1), Some(0));
        assert_eq!(wallet.cycle(1, 1), Some(2));
    }

    #[test]
    fn saved_ago_buckets() {
        let wallet = Wallet::new(WalletHeader::new());
        let saved = wallet.header.saved_at;
        assert_eq!(wallet.saved_ago(saved + Duration::seconds(30)), "Saved now!");
        assert_eq!(
            wallet.saved_ago(saved + Duration::minutes(5)),
            "Saved 5 minute(s) ago"
        );
        assert_eq!(
            wallet.saved_ago(saved + Duration::hours(3)),
            "Saved 3 hour(s) ago"
        );
        assert_eq!(wallet.saved_ago(saved + Duration::days(2)), "");
    }

    #[test]
    fn backup_round_trip_keeps_types_and_brightness() {
        let mut wallet = Wallet::new(WalletHeader::new());
        wallet.header.bright = true;
        wallet
            .append_card(Card::new("Gym", "ABC-123", Some("red"), Selector::Code39).unwrap())
            .unwrap();
        wallet.append_card(card("5901234123457")).unwrap();
        let json = wallet.export_backup().unwrap();

        let mut restored = Wallet::new(WalletHeader::new());
        assert_eq!(restored.import_backup(&json).unwrap(), 2);
        assert_eq!(restored.cards, wallet.cards);
        assert!(restored.header.bright);
    }

    #[test]
    fn import_applies_defaults_skips_blank_codes_and_truncates() {
        let mut entries = vec![
            r##"{"name":"NoCode","code":""}"##.to_string(),
            r##"{"name":"Store","code":"123"}"##.to_string(),
        ];
        for i in 0..10 {
            entries.push(format!(r##"{{"code":"C{i}","type":1,"color":"#808080"}}"##));
        }
        let json = format!(r#"{{"barcodes":[{}]}}"#, entries.join(","));
        let mut wallet = Wallet::new(WalletHeader::new());
        // the cap applies to the first seven entries, blank one included
        assert_eq!(wallet.import_backup(&json).unwrap(), MAX_CARDS - 1);
        assert_eq!(wallet.cards.last().unwrap().code, "C4");
        assert_eq!(wallet.cards[0].name, "Store");
        assert_eq!(wallet.cards[0].color, DEFAULT_COLOR);
        assert_eq!(wallet.cards[0].selector, Selector::Auto);
        assert_eq!(wallet.cards[1].selector, Selector::Code128);
        assert!(!wallet.header.bright);
    }

    #[test]
    fn blank_entries_count_towards_the_import_cap() {
        let mut entries = vec![r##"{"code":""}"##.to_string()];
        for i in 0..MAX_CARDS {
            entries.push(format!(r##"{{"code":"C{i}"}}"##));
        }
        let json = format!(r#"{{"barcodes":[{}]}}"#, entries.join(","));
        let mut wallet = Wallet::new(WalletHeader::new());
        assert_eq!(wallet.import_backup(&json).unwrap(), 6);
        let codes: Vec<&str> = wallet.cards.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["C0", "C1", "C2", "C3", "C4", "C5"]);
    }

    #[test]
    fn import_tolerates_loose_colors_and_types() {
        let json = r##"{"barcodes":[
            {"name":"Short","code":"123","color":"#FFF"},
            {"name":"Text","code":"456","type":"1"},
            {"name":"Odd","code":"789","type":"2x"},
            {"name":"Junk","code":"012","type":"none","color":"blue"}
        ]}"##;
        let mut wallet = Wallet::new(WalletHeader::new());
        assert_eq!(wallet.import_backup(json).unwrap(), 4);
        assert_eq!(wallet.cards[0].color, DEFAULT_COLOR);
        assert_eq!(wallet.cards[1].selector, Selector::Code128);
        assert_eq!(wallet.cards[2].selector, Selector::Code39);
        assert_eq!(wallet.cards[3].selector, Selector::Auto);
        assert_eq!(wallet.cards[3].color, "#535BFF");
    }

    #[test]
    fn backup_entry_color_checks() {
        let entry: BackupEntry = serde_json::from_str(r##"{"code":"1","color":"#FFF"}"##).unwrap();
        assert!(entry.has_invalid_color());
        assert_eq!(entry.resolved_color(), DEFAULT_COLOR);
        let entry: BackupEntry = serde_json::from_str(r##"{"code":"1"}"##).unwrap();
        assert!(!entry.has_invalid_color());
        assert_eq!(entry.type_code, None);
    }

    #[test]
    fn empty_wallet_index_errors_say_so() {
        let mut wallet = Wallet::new(WalletHeader::new());
        let err = wallet.remove_card(0).unwrap_err();
        assert_eq!(err.to_string(), "wallet has no cards");
    }

    #[test]
    fn import_rejects_documents_without_barcodes() {
        let mut wallet = Wallet::new(WalletHeader::new());
        assert!(wallet.import_backup(r#"{"cards":[]}"#).is_err());
        assert!(wallet.import_backup("not json").is_err());
    }

    #[test]
    fn hash_tracks_content() {
        let mut wallet = Wallet::new(WalletHeader::new());
        let empty = wallet.hash().unwrap();
        assert_eq!(empty.len(), 64);
        wallet.append_card(card("A")).unwrap();
        assert_ne!(wallet.hash().unwrap(), empty);
    }
}
