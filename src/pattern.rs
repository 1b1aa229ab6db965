//! Bibliothèque de motifs : expansion des séquences légales sur N jours et
//! encodage booléen consommé par la contrainte de table.

use crate::model::{RosterProblem, ShiftIdx, ShiftLabel, ShiftPattern};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Garde-fou contre l'explosion combinatoire de l'expansion.
pub const MAX_EXPANDED_SEQUENCES: usize = 500_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern expansion exceeds {limit} sequences")]
    TooManySequences { limit: usize },
    #[error("encoded sequence has {found} values, expected {expected}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("day {day} of the encoded sequence sets more than one shift")]
    SeveralShifts { day: usize },
}

/// Segment partiel d'un motif plus long que `partial_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialSegment<'a> {
    pub pattern: usize,
    pub prefix: &'a [ShiftLabel],
    pub suffix: &'a [ShiftLabel],
}

#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<ShiftPattern>,
    partial_days: usize,
}

impl PatternLibrary {
    pub fn new(patterns: Vec<ShiftPattern>, partial_days: usize) -> Self {
        Self {
            patterns,
            partial_days,
        }
    }

    pub fn from_problem(problem: &RosterProblem) -> Self {
        Self::new(problem.patterns.clone(), problem.partial_days)
    }

    pub fn patterns(&self) -> &[ShiftPattern] {
        &self.patterns
    }

    pub fn partial_days(&self) -> usize {
        self.partial_days
    }

    /// Préfixe et suffixe de `partial_days` jours de chaque motif assez long.
    pub fn segments(&self) -> impl Iterator<Item = PartialSegment<'_>> {
        let p = self.partial_days;
        self.patterns
            .iter()
            .enumerate()
            .filter(move |(_, pattern)| pattern.len() > p)
            .map(move |(idx, pattern)| PartialSegment {
                pattern: idx,
                prefix: &pattern.labels[..p],
                suffix: &pattern.labels[pattern.len() - p..],
            })
    }

    /// Suffixes distincts qui complètent un motif dont `tail` est le préfixe.
    pub fn continuations(&self, tail: &[ShiftLabel]) -> Vec<&[ShiftLabel]> {
        let mut out: Vec<&[ShiftLabel]> = Vec::new();
        if tail.len() != self.partial_days {
            return out;
        }
        for segment in self.segments().filter(|s| s.prefix == tail) {
            if !out.contains(&segment.suffix) {
                out.push(segment.suffix);
            }
        }
        out
    }

    /// Toutes les séquences de `num_days` jours : un suffixe partiel optionnel en
    /// tête, puis des motifs entiers jusqu'à couvrir la fenêtre, tronqués à
    /// exactement `num_days`. Sans doublon, ordre déterministe.
    pub fn expand(&self, num_days: usize) -> Result<Vec<Vec<ShiftLabel>>, PatternError> {
        let mut expansion = Expansion {
            patterns: &self.patterns,
            num_days,
            visited: HashSet::new(),
            seen: HashSet::new(),
            out: Vec::new(),
        };
        if num_days == 0 || self.patterns.iter().any(ShiftPattern::is_empty) {
            return Ok(expansion.out);
        }

        let mut buf = Vec::with_capacity(num_days + self.longest());
        expansion.extend(&mut buf)?;
        let leads: Vec<&[ShiftLabel]> = self.segments().map(|s| s.suffix).collect();
        for lead in leads {
            buf.clear();
            buf.extend_from_slice(lead);
            expansion.extend(&mut buf)?;
        }
        Ok(expansion.out)
    }

    /// Expansion encodée pour la période courante ; les séquences qui placent
    /// un poste un jour où il n'est pas proposé sont écartées.
    pub fn admissible(&self, layout: &DayLayout) -> Result<AdmissibleSet, PatternError> {
        let sequences = self.expand(layout.num_days())?;
        let total = sequences.len();
        let mut seen = HashSet::new();
        let mut tuples = Vec::new();
        for sequence in &sequences {
            if let Some(tuple) = layout.encode(sequence) {
                if seen.insert(tuple.clone()) {
                    tuples.push(tuple);
                }
            }
        }
        let discarded = total - tuples.len();
        debug!(
            sequences = total,
            admissible = tuples.len(),
            discarded,
            "expanded shift patterns"
        );
        Ok(AdmissibleSet { tuples, discarded })
    }

    fn longest(&self) -> usize {
        self.patterns.iter().map(ShiftPattern::len).max().unwrap_or(0)
    }
}

struct Expansion<'a> {
    patterns: &'a [ShiftPattern],
    num_days: usize,
    /// Préfixes incomplets déjà développés : deux compositions qui donnent les
    /// mêmes jours ont le même sous-arbre.
    visited: HashSet<Vec<ShiftLabel>>,
    seen: HashSet<Vec<ShiftLabel>>,
    out: Vec<Vec<ShiftLabel>>,
}

impl Expansion<'_> {
    fn extend(&mut self, buf: &mut Vec<ShiftLabel>) -> Result<(), PatternError> {
        if buf.len() >= self.num_days {
            let sequence = buf[..self.num_days].to_vec();
            if self.seen.insert(sequence.clone()) {
                if self.out.len() == MAX_EXPANDED_SEQUENCES {
                    return Err(PatternError::TooManySequences {
                        limit: MAX_EXPANDED_SEQUENCES,
                    });
                }
                self.out.push(sequence);
            }
            return Ok(());
        }
        if !self.visited.insert(buf.clone()) {
            return Ok(());
        }
        for pattern in self.patterns {
            let mark = buf.len();
            buf.extend_from_slice(&pattern.labels);
            self.extend(buf)?;
            buf.truncate(mark);
        }
        Ok(())
    }
}

/// Postes proposés pour chaque jour de la fenêtre, dans l'ordre du catalogue.
/// Fixe l'ordre des booléens d'une séquence encodée.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLayout {
    days: Vec<Vec<ShiftIdx>>,
}

impl DayLayout {
    pub fn new(days: Vec<Vec<ShiftIdx>>) -> Self {
        Self { days }
    }

    pub fn for_current_period(problem: &RosterProblem) -> Self {
        Self::new(
            problem
                .calendar
                .current_days()
                .map(|day| problem.shifts_on(day).collect())
                .collect(),
        )
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    /// Nombre total de booléens d'une séquence encodée.
    pub fn width(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    pub fn shifts_on(&self, offset: usize) -> &[ShiftIdx] {
        &self.days[offset]
    }

    /// One-hot par jour ; repos = que des zéros. `None` si un poste tombe un
    /// jour où il n'est pas proposé.
    pub fn encode(&self, labels: &[ShiftLabel]) -> Option<Vec<bool>> {
        if labels.len() != self.days.len() {
            return None;
        }
        let mut out = Vec::with_capacity(self.width());
        for (label, offered) in labels.iter().zip(&self.days) {
            if let ShiftLabel::Work(shift) = label {
                if !offered.contains(shift) {
                    return None;
                }
            }
            out.extend(offered.iter().map(|s| *label == ShiftLabel::Work(*s)));
        }
        Some(out)
    }

    pub fn decode(&self, tuple: &[bool]) -> Result<Vec<ShiftLabel>, PatternError> {
        if tuple.len() != self.width() {
            return Err(PatternError::WidthMismatch {
                expected: self.width(),
                found: tuple.len(),
            });
        }
        let mut labels = Vec::with_capacity(self.days.len());
        let mut cursor = 0;
        for (day, offered) in self.days.iter().enumerate() {
            let bits = &tuple[cursor..cursor + offered.len()];
            cursor += offered.len();
            let mut set = offered.iter().zip(bits).filter(|(_, bit)| **bit);
            let label = match (set.next(), set.next()) {
                (None, _) => ShiftLabel::Rest,
                (Some((shift, _)), None) => ShiftLabel::Work(*shift),
                (Some(_), Some(_)) => return Err(PatternError::SeveralShifts { day: day + 1 }),
            };
            labels.push(label);
        }
        Ok(labels)
    }
}

/// Séquences encodées admissibles pour un membre sur la période courante.
#[derive(Debug, Clone, Default)]
pub struct AdmissibleSet {
    tuples: Vec<Vec<bool>>,
    discarded: usize,
}

impl AdmissibleSet {
    pub fn tuples(&self) -> &[Vec<bool>] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Séquences écartées (poste hors jours proposés ou doublon d'encodage).
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn into_tuples(self) -> Vec<Vec<bool>> {
        self.tuples
    }
}
