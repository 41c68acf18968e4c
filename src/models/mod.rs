pub mod admin;
pub mod course;
pub mod lecture;
pub mod report;
pub mod resume;

pub use admin::{AdminAuthRow, LoginRequest, SettingsPatch};
pub use course::{
    CourseListItem, CoursePatch, CourseRow, ManuallyCompletedPatch, SearchResult,
    SetTargetRequest, TargetCourse, VisibilityPatch,
};
pub use lecture::{
    CompletedLectureRow, CompletionPatch, LectureDetail, LectureFact, LectureRow, LectureSummary,
};
pub use report::{
    CompletionEstimate, CourseUpdate, CrawlHistorySummary, CrawlLogEntry, SnapshotRow,
    SummaryStats, TopProgressEntry,
};
pub use resume::ResumeRow;
