mod in_memory_broker;
