//! Plain-text reports printed by `susctl`.

use std::fmt;

use crate::engine::Submission;
use crate::evaluation::EvaluationResult;
use crate::scoring::Grade;
use crate::stats::{BenchmarkPosition, Statistics, INDUSTRY_AVERAGE};

/// Shown instead of the results view when nothing has been recorded.
pub const NO_RESULTS: &str =
    "No evaluation results yet. Complete the SUS evaluation to see results here.";

/// Date layout used in the results table.
const TABLE_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Summary printed after a submission is accepted.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionReport<'a>(pub &'a Submission);

impl fmt::Display for SubmissionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Submission {
            result,
            grade,
            statistics,
        } = self.0;

        writeln!(f, "SUS Score: {:.1}", result.score)?;
        writeln!(f, "Grade: {} ({})", grade.letter(), grade.label())?;
        writeln!(f)?;
        write!(f, "{GradeGuide}")?;
        writeln!(f)?;
        writeln!(f, "Average SUS Score: {INDUSTRY_AVERAGE}")?;
        let comparison = match BenchmarkPosition::of(result.score) {
            BenchmarkPosition::Above => "above",
            BenchmarkPosition::At => "equal to",
            BenchmarkPosition::Below => "below",
        };
        writeln!(
            f,
            "Your score of {:.1} is {comparison} the average.",
            result.score
        )?;
        writeln!(f)?;
        write!(f, "{}", StatisticsBlock(statistics))
    }
}

/// Statistics, the numbered result table, the grade guide and the benchmark.
#[derive(Debug, Clone, Copy)]
pub struct ResultsReport<'a> {
    history: &'a [EvaluationResult],
}

impl<'a> ResultsReport<'a> {
    /// Report over `history`, oldest first.
    #[must_use]
    pub fn new(history: &'a [EvaluationResult]) -> Self {
        Self { history }
    }
}

impl fmt::Display for ResultsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(stats) = Statistics::aggregate(self.history) else {
            return writeln!(f, "{NO_RESULTS}");
        };

        write!(f, "{}", StatisticsBlock(&stats))?;
        writeln!(f)?;

        writeln!(
            f,
            "{:>3}  {:<16}  {:>5}  {:<5}  {:<14}  Answers",
            "#", "Date", "Score", "Grade", "Interpretation"
        )?;
        for (index, result) in self.history.iter().enumerate() {
            let grade = result.grade();
            let answers = result
                .responses
                .answers()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                f,
                "{:>3}  {:<16}  {:>5.1}  {:<5}  {:<14}  {answers}",
                index + 1,
                result.timestamp.format(TABLE_DATE_FORMAT).to_string(),
                result.score,
                grade.letter(),
                grade.label(),
            )?;
        }
        writeln!(f)?;

        write!(f, "{GradeGuide}")?;
        writeln!(f)?;
        writeln!(f, "Average SUS Score: {INDUSTRY_AVERAGE}")?;
        writeln!(
            f,
            "Your average score of {:.1} is {}.",
            stats.average,
            stats.benchmark().phrase()
        )
    }
}

/// The grade scale, one band per line.
#[derive(Debug, Clone, Copy)]
pub struct GradeGuide;

impl fmt::Display for GradeGuide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grade Scale:")?;
        for grade in Grade::ALL {
            writeln!(
                f,
                "  {} = Grade {} ({})",
                grade.range_label(),
                grade.letter(),
                grade.label()
            )?;
        }
        Ok(())
    }
}

struct StatisticsBlock<'a>(&'a Statistics);

impl fmt::Display for StatisticsBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "Total Evaluations: {}", stats.count)?;
        writeln!(f, "Average Score: {:.1}", stats.average)?;
        writeln!(f, "Highest Score: {:.1}", stats.max)?;
        writeln!(f, "Lowest Score: {:.1}", stats.min)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::survey::SurveyResponse;

    fn result_at(answers: [i32; 10], day: u32) -> EvaluationResult {
        EvaluationResult::record_at(
            SurveyResponse::unchecked(answers),
            Utc.with_ymd_and_hms(2025, 1, day, 9, 30, 5).unwrap(),
        )
    }

    fn submission_for(result: EvaluationResult) -> Submission {
        let statistics = Statistics::aggregate(std::slice::from_ref(&result)).unwrap();
        Submission {
            grade: result.grade(),
            result,
            statistics,
        }
    }

    #[test]
    fn test_grade_guide_lists_every_band() {
        let guide = GradeGuide.to_string();
        assert!(guide.contains("80.3+ = Grade A (Excellent)"));
        assert!(guide.contains("68-80.2 = Grade B (Good)"));
        assert!(guide.contains("51-67.9 = Grade C (OK)"));
        assert!(guide.contains("39-50.9 = Grade D (Poor)"));
        assert!(guide.contains("0-38.9 = Grade F (Awful)"));
    }

    #[test]
    fn test_submission_report() {
        let submission = submission_for(result_at([4, 2, 4, 2, 4, 2, 4, 3, 3, 2], 11));
        let report = SubmissionReport(&submission).to_string();

        assert!(report.contains("SUS Score: 70.0"));
        assert!(report.contains("Grade: B (Good)"));
        assert!(report.contains("Average SUS Score: 68"));
        assert!(report.contains("Your score of 70.0 is above the average."));
        assert!(report.contains("Total Evaluations: 1"));
    }

    #[test]
    fn test_submission_report_benchmark_wording() {
        let below = submission_for(result_at([3; 10], 11));
        assert!(SubmissionReport(&below)
            .to_string()
            .contains("Your score of 50.0 is below the average."));

        let mut at = submission_for(result_at([3; 10], 11));
        at.result.score = 68.0;
        assert!(SubmissionReport(&at)
            .to_string()
            .contains("Your score of 68.0 is equal to the average."));
    }

    #[test]
    fn test_results_report_empty() {
        assert_eq!(ResultsReport::new(&[]).to_string().trim(), NO_RESULTS);
    }

    #[test]
    fn test_results_report() {
        let history = vec![
            result_at([5, 1, 5, 1, 5, 1, 5, 1, 5, 1], 10),
            result_at([3; 10], 11),
        ];
        let report = ResultsReport::new(&history).to_string();

        assert!(report.contains("Total Evaluations: 2"));
        assert!(report.contains("Average Score: 75.0"));
        assert!(report.contains("Highest Score: 100.0"));
        assert!(report.contains("Lowest Score: 50.0"));
        assert!(report.contains("10/01/2025 09:30"));
        assert!(report.contains("5, 1, 5, 1, 5, 1, 5, 1, 5, 1"));
        assert!(report.contains("Excellent"));
        assert!(report.contains("Grade Scale:"));
        assert!(report.contains("Your average score of 75.0 is above average."));
    }

    #[test]
    fn test_results_rows_are_numbered_in_order() {
        let history = vec![result_at([3; 10], 10), result_at([3; 10], 11)];
        let report = ResultsReport::new(&history).to_string();

        let rows: Vec<&str> = report
            .lines()
            .filter(|line| line.contains("/01/2025"))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].trim_start().starts_with("1 "));
        assert!(rows[0].contains("10/01/2025"));
        assert!(rows[1].trim_start().starts_with("2 "));
    }
}
