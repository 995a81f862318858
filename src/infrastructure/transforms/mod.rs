pub mod background_removal;
