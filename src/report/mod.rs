//! Reports over stored issues: a JSON summary of references, and a LaTeX document.

mod latex;
pub use latex::{IssueActivity, LatexReport, ReportOptions, ReportSection, compile_pdf};

mod references;
pub use references::{CommentReferences, IssueReferences};
