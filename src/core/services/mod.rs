pub mod calendar_service;
pub mod filter_service;
pub mod mileage_service;
pub mod summary_service;
pub mod transfer_service;

pub use calendar_service::{
    CalendarCell, CalendarMonth, CalendarService, DayDetail, DEFAULT_DISPLAY_CAP, GRID_SLOTS,
};
pub use filter_service::{FilterCriteria, FilterService, SortKey};
pub use mileage_service::{MileageReport, MileageRow, MileageService, DISTANCE_UNIT};
pub use summary_service::{
    CategoryTotal, DayTotal, ListSummary, MonthStats, QuickSummary, SummaryService,
};
pub use transfer_service::{TransferService, DEFAULT_BACKUP_FILE};
