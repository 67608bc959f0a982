pub mod csv;
pub mod email_index;
pub mod staff_id;
