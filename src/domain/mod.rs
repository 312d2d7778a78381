pub mod authorization;
pub mod book;
pub mod changes;
pub mod commands;
pub mod errors;
pub mod events;
pub mod fine;
pub mod identity;
pub mod lifecycle;
pub mod loan;
pub mod reservation;
pub mod review;
pub mod value_objects;

pub use authorization::*;
pub use book::{Book, BookDetails};
pub use changes::*;
pub use errors::*;
pub use events::*;
pub use fine::Fine;
pub use identity::*;
pub use lifecycle::{Availability, BookSnapshot, CatalogEntry, ReturnOutcome, Transition};
pub use loan::{Loan, LoanStatus, LoanView};
pub use reservation::{Reservation, ReservationStatus, ReservationView};
pub use review::{BookRating, Review};
pub use value_objects::*;
