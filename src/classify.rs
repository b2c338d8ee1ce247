//! Trial-identifier classification.
//!
//! Every Dataviewer row carries a free-text `identifier` naming the screen that
//! was shown (`"Validity_Page3"`, `"Z_Question_Deep3"`, `"BIGBREAK"` …).  This
//! module derives four categorical columns from it:
//!
//! ```text
//! identifier ──┬─ TRIAL_TYPE_RULES  (first substring match wins) → TrialType
//!              ├─ TEXT_RULES        (first substring match wins) → Text
//!              ├─ STAGE_RULES       (first substring match wins) → Stage
//!              └─ first ASCII digit (+1 for reading / sham)      → PageNum
//! ```
//!
//! The rule tables are plain ordered slices so the precedence is visible in one
//! place and testable on its own.  Classification never fails: an identifier
//! that matches nothing gets the fallthrough labels.
use anyhow::{Context, Result};
use csv::StringRecord;
use std::fmt;

// ── Labels ────────────────────────────────────────────────────────────────────

/// Kind of task segment a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrialType {
    Sham,
    Prac,
    Mw,
    Svt,
    Inference,
    Rote,
    Deep,
    DriftCorrect,
    Recal,
    Break,
    RestingState,
    Localizer,
    Undefined,
    Na,
    Reading,
}

impl TrialType {
    /// Label as written to output tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialType::Sham => "sham",
            TrialType::Prac => "Prac",
            TrialType::Mw => "MW",
            TrialType::Svt => "SVT",
            TrialType::Inference => "Inference",
            TrialType::Rote => "Rote",
            TrialType::Deep => "Deep",
            TrialType::DriftCorrect => "DriftCorrect",
            TrialType::Recal => "Recal",
            TrialType::Break => "Break",
            TrialType::RestingState => "restingState",
            TrialType::Localizer => "Localizer",
            TrialType::Undefined => "UNDEFINED",
            TrialType::Na => "NA",
            TrialType::Reading => "reading",
        }
    }
}

/// Which of the five study texts a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Text {
    Validity,
    Bias,
    CausalClaims,
    Variables,
    Hypotheses,
    Na,
}

impl Text {
    pub fn as_str(&self) -> &'static str {
        match self {
            Text::Validity => "Validity",
            Text::Bias => "Bias",
            Text::CausalClaims => "CausalClaims",
            Text::Variables => "Variables",
            Text::Hypotheses => "Hypotheses",
            Text::Na => "NA",
        }
    }
}

/// Question stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    X,
    Y,
    Z,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::X => "X",
            Stage::Y => "Y",
            Stage::Z => "Z",
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {$(
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}
display_as_str!(TrialType, Text, Stage);

// ── Rule tables ───────────────────────────────────────────────────────────────

/// Condition of a single classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Case-sensitive substring of the identifier.
    Contains(&'static str),
    /// Participant ID contains the configured sentinel and the lowercased
    /// identifier contains `"sham"`.
    SentinelSham,
}

impl Predicate {
    fn matches(&self, identifier: &str, participant_id: &str, sentinel: &str) -> bool {
        match self {
            Predicate::Contains(needle) => identifier.contains(needle),
            Predicate::SentinelSham => {
                participant_id.contains(sentinel) && identifier.to_lowercase().contains("sham")
            }
        }
    }
}

/// Ordered TrialType rules. Anything left over is [`TrialType::Reading`].
pub const TRIAL_TYPE_RULES: &[(Predicate, TrialType)] = &[
    (Predicate::Contains("Sham"), TrialType::Sham),
    (Predicate::Contains("Practice"), TrialType::Prac),
    (Predicate::Contains("MW"), TrialType::Mw),
    (Predicate::Contains("SVT"), TrialType::Svt),
    (Predicate::Contains("Inf"), TrialType::Inference),
    (Predicate::Contains("Rote"), TrialType::Rote),
    (Predicate::Contains("Deep"), TrialType::Deep),
    (Predicate::Contains("DriftCorrect"), TrialType::DriftCorrect),
    (Predicate::Contains("Recal"), TrialType::Recal),
    (Predicate::Contains("BIGBREAK"), TrialType::Break),
    (Predicate::Contains("Resting"), TrialType::RestingState),
    (Predicate::Contains("Localizer"), TrialType::Localizer),
    (Predicate::Contains("IBI began"), TrialType::Localizer),
    (Predicate::Contains("Lang Task"), TrialType::Localizer),
    (Predicate::Contains("UNDEFINED"), TrialType::Undefined),
    (Predicate::SentinelSham, TrialType::Na),
    // Unreachable: anything containing "ShamStart" already matched "Sham".
    (Predicate::Contains("ShamStart"), TrialType::Na),
];

/// Ordered Text rules. Anything left over is [`Text::Na`].
pub const TEXT_RULES: &[(&str, Text)] = &[
    ("Validity", Text::Validity),
    ("Bias", Text::Bias),
    ("CausalClaims", Text::CausalClaims),
    ("Variables", Text::Variables),
    ("Hypotheses", Text::Hypotheses),
];

/// Ordered Stage rules. Anything left over is [`Stage::X`].
///
/// The labels are crossed relative to the substrings (`Z_Question` → `Y`).
pub const STAGE_RULES: &[(&str, Stage)] = &[("Z_Question", Stage::Y), ("Y_Question", Stage::Z)];

/// TrialType labels whose page digit is shifted by one (0-based screens).
///
/// Compared against [`TrialType::as_str`]; `"prac"` never equals the `"Prac"`
/// label, so practice pages are not shifted.
pub const PAGE_OFFSET_LABELS: &[&str] = &["reading", "sham", "prac"];

// ── Classification ────────────────────────────────────────────────────────────

/// Derived labels for one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub trial_type: TrialType,
    pub text: Text,
    pub stage: Stage,
    /// `None` when the identifier has no digit.
    pub page_num: Option<u32>,
}

/// Classify a single identifier.
///
/// `participant_id` and `sentinel` only matter for the
/// [`Predicate::SentinelSham`] rule.
///
/// # Examples
///
/// ```
/// use gazeprep::classify::{classify, Stage, Text, TrialType};
///
/// let c = classify("Z_Question_Deep3", "EML1_042", "EML1_001");
/// assert_eq!(c.trial_type, TrialType::Deep);
/// assert_eq!(c.stage, Stage::Y);
/// assert_eq!(c.text, Text::Na);
/// assert_eq!(c.page_num, Some(3));
/// ```
pub fn classify(identifier: &str, participant_id: &str, sentinel: &str) -> Classification {
    let trial_type = trial_type_of(identifier, participant_id, sentinel);
    Classification {
        trial_type,
        text: first_match(TEXT_RULES, identifier).unwrap_or(Text::Na),
        stage: first_match(STAGE_RULES, identifier).unwrap_or(Stage::X),
        page_num: page_num_of(identifier, trial_type),
    }
}

/// TrialType by [`TRIAL_TYPE_RULES`], falling back to `reading`.
pub fn trial_type_of(identifier: &str, participant_id: &str, sentinel: &str) -> TrialType {
    TRIAL_TYPE_RULES
        .iter()
        .find(|(p, _)| p.matches(identifier, participant_id, sentinel))
        .map(|&(_, t)| t)
        .unwrap_or(TrialType::Reading)
}

/// First ASCII digit of `identifier`, shifted by one for the
/// [`PAGE_OFFSET_LABELS`] trial types.
pub fn page_num_of(identifier: &str, trial_type: TrialType) -> Option<u32> {
    let digit = identifier.chars().find_map(|c| c.to_digit(10))?;
    if PAGE_OFFSET_LABELS.contains(&trial_type.as_str()) {
        Some(digit + 1)
    } else {
        Some(digit)
    }
}

fn first_match<T: Copy>(rules: &[(&str, T)], identifier: &str) -> Option<T> {
    rules.iter().find(|(needle, _)| identifier.contains(needle)).map(|&(_, v)| v)
}

// ── Session label ─────────────────────────────────────────────────────────────

/// Fields sliced out of `RECORDING_SESSION_LABEL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLabel {
    /// First 8 characters.
    pub participant_id: String,
    /// Last 5 characters.
    pub file_part: String,
    /// Last character.
    pub part_no: String,
}

impl SessionLabel {
    /// Slice by character. Labels shorter than a slice width yield the whole
    /// label for that field.
    pub fn parse(label: &str) -> Self {
        let chars: Vec<char> = label.chars().collect();
        let tail = |n: usize| chars[chars.len().saturating_sub(n)..].iter().collect::<String>();
        Self {
            participant_id: chars.iter().take(8).collect(),
            file_part: tail(5),
            part_no: tail(1),
        }
    }
}

// ── Table-level classification ────────────────────────────────────────────────

/// Columns appended by [`classify_records`], in order.
pub const DERIVED_COLUMNS: &[&str] =
    &["ParticipantID", "FilePart", "PartNo", "TrialType", "Text", "Stage", "PageNum"];

/// Append [`DERIVED_COLUMNS`] to every record of a raw report table.
///
/// `headers` must contain `RECORDING_SESSION_LABEL` and `identifier`.  Returns
/// the extended header row; records are extended in place.  A record too short
/// to hold either column is classified as if the cell were empty.
pub fn classify_records(
    headers: &StringRecord,
    records: &mut [StringRecord],
    sentinel: &str,
) -> Result<StringRecord> {
    let label_col = column_index(headers, "RECORDING_SESSION_LABEL")?;
    let ident_col = column_index(headers, "identifier")?;

    for rec in records.iter_mut() {
        let session = SessionLabel::parse(rec.get(label_col).unwrap_or(""));
        let c = classify(rec.get(ident_col).unwrap_or(""), &session.participant_id, sentinel);
        let page = c.page_num.map(|p| p.to_string()).unwrap_or_default();
        rec.push_field(&session.participant_id);
        rec.push_field(&session.file_part);
        rec.push_field(&session.part_no);
        rec.push_field(c.trial_type.as_str());
        rec.push_field(c.text.as_str());
        rec.push_field(c.stage.as_str());
        rec.push_field(&page);
    }

    let mut out = headers.clone();
    for col in DERIVED_COLUMNS {
        out.push_field(col);
    }
    Ok(out)
}

/// Position of `name` in a header row.
pub fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("missing '{name}' column"))
}
