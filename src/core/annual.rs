use super::error::PreconditionViolation;
use super::growth::apply_year;
use super::types::{AnnualScheduleEntry, ProjectionPoint, ProjectionResult};

/// Projects `principal` through a dense, zero-based, ascending schedule.
///
/// The result has `schedule.len() + 1` points; point 0 is the principal and
/// point `n + 1` is the balance after schedule year `n`.
pub fn project(
    principal: f64,
    schedule: &[AnnualScheduleEntry],
) -> Result<ProjectionResult, PreconditionViolation> {
    let points = projection(principal, schedule)?.collect();
    Ok(ProjectionResult::from_points(points))
}

/// Lazy form of [`project`]. The iterator is `Clone`; a copy taken before
/// consuming replays the curve from year 0.
pub fn projection(
    principal: f64,
    schedule: &[AnnualScheduleEntry],
) -> Result<AnnualProjection<'_>, PreconditionViolation> {
    check_dense(schedule)?;
    Ok(AnnualProjection {
        balance: principal,
        emitted_principal: false,
        entries: schedule.iter(),
    })
}

pub(crate) fn check_dense(schedule: &[AnnualScheduleEntry]) -> Result<(), PreconditionViolation> {
    let mut previous: Option<u32> = None;
    for (position, entry) in schedule.iter().enumerate() {
        let expected = position as u32;
        let found = entry.year_index;
        if found != expected {
            return Err(match previous {
                Some(prev) if found == prev => PreconditionViolation::DuplicateYear { year: found },
                Some(prev) if found < prev => PreconditionViolation::YearOutOfOrder {
                    previous: prev,
                    found,
                },
                _ => PreconditionViolation::MissingYear { expected, found },
            });
        }
        previous = Some(found);
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct AnnualProjection<'a> {
    balance: f64,
    emitted_principal: bool,
    entries: std::slice::Iter<'a, AnnualScheduleEntry>,
}

impl Iterator for AnnualProjection<'_> {
    type Item = ProjectionPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.emitted_principal {
            self.emitted_principal = true;
            return Some(ProjectionPoint {
                year: 0,
                balance: self.balance,
            });
        }

        let entry = self.entries.next()?;
        self.balance = apply_year(self.balance, entry.rate, entry.monthly_deposit);
        Some(ProjectionPoint {
            year: entry.year_index + 1,
            balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len() + usize::from(!self.emitted_principal);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AnnualProjection<'_> {}

/// How many leading schedule years a caller wants on screen.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum YearWindow {
    Ten,
    #[default]
    Thirty,
    Fifty,
    Hundred,
}

impl YearWindow {
    pub const ALL: [YearWindow; 4] = [
        YearWindow::Ten,
        YearWindow::Thirty,
        YearWindow::Fifty,
        YearWindow::Hundred,
    ];

    pub fn years(self) -> u32 {
        match self {
            YearWindow::Ten => 10,
            YearWindow::Thirty => 30,
            YearWindow::Fifty => 50,
            YearWindow::Hundred => 100,
        }
    }

    pub fn from_years(years: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.years() == years)
    }

    /// Prefix of `schedule` covered by this window. Truncation always happens
    /// on the input, never on a projected curve.
    pub fn slice(self, schedule: &[AnnualScheduleEntry]) -> &[AnnualScheduleEntry] {
        let end = schedule.len().min(self.years() as usize);
        &schedule[..end]
    }
}

/// Owned, validated annual schedule with typed per-year edits.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnualSchedule {
    entries: Vec<AnnualScheduleEntry>,
}

impl AnnualSchedule {
    /// Accepts rows in any order (stores hand them back unordered) and sorts
    /// them by year before checking density.
    pub fn from_entries(
        mut entries: Vec<AnnualScheduleEntry>,
    ) -> Result<Self, PreconditionViolation> {
        entries.sort_by_key(|e| e.year_index);
        check_dense(&entries)?;
        Ok(Self { entries })
    }

    pub fn uniform(years: u32, rate: f64, monthly_deposit: f64) -> Self {
        let entries = (0..years)
            .map(|year| AnnualScheduleEntry::new(year, rate, monthly_deposit))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[AnnualScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self, window: YearWindow) -> &[AnnualScheduleEntry] {
        window.slice(&self.entries)
    }

    pub fn set_rate(&mut self, year: u32, rate: f64) -> Result<(), PreconditionViolation> {
        self.entry_mut(year)?.rate = rate;
        Ok(())
    }

    pub fn set_monthly_deposit(
        &mut self,
        year: u32,
        monthly_deposit: f64,
    ) -> Result<(), PreconditionViolation> {
        self.entry_mut(year)?.monthly_deposit = monthly_deposit;
        Ok(())
    }

    pub fn project(&self, principal: f64, window: YearWindow) -> ProjectionResult {
        // Entries are dense by construction.
        let points = AnnualProjection {
            balance: principal,
            emitted_principal: false,
            entries: self.window(window).iter(),
        }
        .collect();
        ProjectionResult::from_points(points)
    }

    fn entry_mut(&mut self, year: u32) -> Result<&mut AnnualScheduleEntry, PreconditionViolation> {
        self.entries
            .get_mut(year as usize)
            .ok_or(PreconditionViolation::UnknownYear { year })
    }
}
