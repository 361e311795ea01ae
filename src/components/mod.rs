pub mod day_view;
pub mod forms;
pub mod month_view;
pub mod plan_list;
pub mod task_list;
pub mod week_view;

pub use day_view::DayView;
pub use forms::Form;
pub use month_view::MonthView;
pub use plan_list::PlanList;
pub use task_list::TaskList;
pub use week_view::WeekView;
