mod filter_tabs;
mod task_card;
mod task_carousel;

pub use filter_tabs::FilterTabs;
pub use task_card::TaskCard;
pub use task_carousel::TaskCarousel;
