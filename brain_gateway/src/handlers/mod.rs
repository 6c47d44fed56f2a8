pub mod index_reconciliation;
